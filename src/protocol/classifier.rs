// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Request classification.
//!
//! Turns a [`RawRequest`] into a validated [`RequestEnvelope`]. Parameters come from
//! the query string on GET and from the decoded body on POST. A path segment
//! beyond the REST prefix is a method shorthand that forces the version and format.
//!
//! Field checks run in two passes, each in the fixed order method, version, format:
//! first presence ("missing …"), then non-emptiness ("invalid …"). The first failing
//! check decides the single reported error.

use bytes::Bytes;
use serde_json::Value;

use super::catalog::ErrorKey;
use super::envelope::{HttpMethod, Params, RawRequest, RequestEnvelope, WireFormat};
use crate::config::rest::RestConfig;

/// Query/body field carrying the method identifier.
pub const METHOD_FIELD: &str = "method";
/// Query/body field carrying the version.
pub const VERSION_FIELD: &str = "v";
/// Query/body field carrying the format.
pub const FORMAT_FIELD: &str = "format";

/// A request refused before dispatch, with the format its error should be
/// rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    /// Catalog entry to report
    pub key: ErrorKey,
    /// Format hint taken from whatever parameters could be extracted
    pub format: WireFormat,
}

impl Rejection {
    fn new(key: ErrorKey, params: &Params) -> Self {
        Self {
            key,
            format: format_hint(params),
        }
    }
}

/// Validates the protocol envelope of incoming requests.
#[derive(Debug, Clone)]
pub struct Classifier {
    prefix: String,
    shorthand_version: String,
    shorthand_format: String,
}

impl Classifier {
    /// Creates a classifier for the configured REST endpoint.
    pub fn new(config: &RestConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            shorthand_version: config.shorthand_version.clone(),
            shorthand_format: config.shorthand_format.clone(),
        }
    }

    /// The configured REST prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Classifies a raw request into an envelope, or the single error to report.
    pub async fn classify(&self, raw: &RawRequest) -> Result<RequestEnvelope, Rejection> {
        tracing::trace!(method = %raw.method, path = %raw.path, "Classifying request");

        let query = query_params(raw);
        let Some(remainder) = self.strip_prefix(&raw.path) else {
            return Err(Rejection::new(ErrorKey::SystemBusy, &query));
        };
        let Some(http_method) = HttpMethod::from_http(&raw.method) else {
            return Err(Rejection::new(ErrorKey::SystemBusy, &query));
        };

        // The body is only decoded once the request is known to target the endpoint.
        let mut params = match http_method {
            HttpMethod::Post => match extract_body_params(raw).await {
                Ok(params) => params,
                Err(key) => return Err(Rejection::new(key, &query)),
            },
            HttpMethod::Get => query,
        };

        let shorthand = remainder.trim_start_matches('/');
        if !shorthand.is_empty() {
            params.insert(METHOD_FIELD.to_string(), Value::String(shorthand.to_string()));
            params.insert(
                VERSION_FIELD.to_string(),
                Value::String(self.shorthand_version.clone()),
            );
            params.insert(
                FORMAT_FIELD.to_string(),
                Value::String(self.shorthand_format.clone()),
            );
        }

        let checks = [
            (METHOD_FIELD, ErrorKey::MissingMethod, ErrorKey::InvalidMethod),
            (VERSION_FIELD, ErrorKey::MissingVersion, ErrorKey::InvalidVersion),
            (FORMAT_FIELD, ErrorKey::MissingFormat, ErrorKey::InvalidFormat),
        ];
        for (field, missing, _) in checks {
            if !params.contains_key(field) {
                return Err(Rejection::new(missing, &params));
            }
        }
        let mut values: [String; 3] = Default::default();
        for (slot, (field, _, invalid)) in values.iter_mut().zip(checks) {
            match params.get(field).and_then(scalar_text) {
                Some(text) if !text.trim().is_empty() => *slot = text,
                _ => return Err(Rejection::new(invalid, &params)),
            }
        }

        for (field, _, _) in checks {
            params.remove(field);
        }
        let [method, version, format] = values;

        Ok(RequestEnvelope {
            http_method,
            method,
            version,
            format,
            params,
        })
    }

    /// Returns the part of `path` after the prefix, or `None` when the path is not
    /// under the prefix at all.
    fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        let remainder = path.strip_prefix(self.prefix.as_str())?;
        if remainder.is_empty() || remainder.starts_with('/') {
            Some(remainder)
        } else {
            None
        }
    }
}

/// Best-effort format hint used to render errors raised before the envelope is complete.
pub fn format_hint(params: &Params) -> WireFormat {
    let format = params.get(FORMAT_FIELD).and_then(scalar_text);
    WireFormat::negotiate(format.as_deref())
}

/// Parameters decoded from the query string. Repeated keys keep the last value.
pub fn query_params(raw: &RawRequest) -> Params {
    raw.query_pairs()
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

/// Decodes a POST body into parameters according to its content type.
///
/// JSON bodies must be objects; URL-encoded bodies become string fields; multipart
/// text fields become string fields and file parts become
/// `{filename, contentType, size}` metadata. Bodies of any other type are ignored.
pub async fn extract_body_params(raw: &RawRequest) -> Result<Params, ErrorKey> {
    let content_type = raw
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/json" => {
            if raw.body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Params::new());
            }
            match serde_json::from_slice::<Value>(&raw.body) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(_) => Err(ErrorKey::MalformedPayload),
                Err(e) => {
                    tracing::debug!(error = %e, "Rejecting malformed JSON body");
                    Err(ErrorKey::MalformedPayload)
                }
            }
        }
        "application/x-www-form-urlencoded" => Ok(url::form_urlencoded::parse(&raw.body)
            .into_owned()
            .map(|(key, value)| (key, Value::String(value)))
            .collect()),
        "multipart/form-data" => multipart_params(&content_type, raw.body.clone()).await,
        _ => Ok(Params::new()),
    }
}

async fn multipart_params(content_type: &str, body: Bytes) -> Result<Params, ErrorKey> {
    let boundary = multer::parse_boundary(content_type).map_err(|e| {
        tracing::debug!(error = %e, "Multipart body without usable boundary");
        ErrorKey::MalformedPayload
    })?;
    let stream = futures::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut params = Params::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting malformed multipart body");
                return Err(ErrorKey::MalformedPayload);
            }
        };
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(|mime| mime.to_string());
                let data = field.bytes().await.map_err(|_| ErrorKey::MalformedPayload)?;
                params.insert(
                    name,
                    serde_json::json!({
                        "filename": filename,
                        "contentType": content_type,
                        "size": data.len(),
                    }),
                );
            }
            None => {
                let text = field.text().await.map_err(|_| ErrorKey::MalformedPayload)?;
                params.insert(name, Value::String(text));
            }
        }
    }
    Ok(params)
}

/// Text form of a scalar parameter; `None` for null, arrays and objects.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
