// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Protocol envelope types.
//!
//! A [`RawRequest`] is what the transport hands over; a [`RequestEnvelope`] is what
//! the classifier produces once the protocol fields have been validated.

use bytes::Bytes;
use http::HeaderMap;
use serde_json::{Map, Value};

/// Parameter mapping carried by a request.
pub type Params = Map<String, Value>;

/// HTTP verbs the gateway accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Query-driven invocation
    Get,
    /// Body-driven invocation
    Post,
}

impl HttpMethod {
    /// Maps a transport verb onto an accepted verb; every other verb is rejected.
    pub fn from_http(method: &http::Method) -> Option<Self> {
        match *method {
            http::Method::GET => Some(Self::Get),
            http::Method::POST => Some(Self::Post),
            _ => None,
        }
    }

    /// Upper-case verb name, for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Wire formats a caller can negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `application/json`
    Json,
    /// `<response>` XML document
    Xml,
    /// Raw payload passthrough
    Binary,
    /// Rendered document (PDF or screenshot) produced through the render side channel
    Pdf,
}

impl WireFormat {
    /// Parses a format string case-insensitively. Unknown or empty strings fall back
    /// to JSON.
    pub fn negotiate(format: Option<&str>) -> Self {
        match format.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            Some("xml") => Self::Xml,
            Some("binary") => Self::Binary,
            Some("pdf") => Self::Pdf,
            _ => Self::Json,
        }
    }

    /// True for formats whose successful result is a raw payload.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Binary | Self::Pdf)
    }
}

/// A request as received by the transport, before any protocol validation.
#[derive(Debug, Clone)]
pub struct RawRequest {
    /// Transport verb
    pub method: http::Method,
    /// Request path, without query
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    /// Request headers
    pub headers: HeaderMap,
    /// Collected request body
    pub body: Bytes,
}

impl RawRequest {
    /// Creates a body-less request for `method` and a path that may carry a query.
    pub fn new(method: http::Method, path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path_and_query.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header; invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::HeaderName::from_bytes(name.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body together with its content type.
    pub fn with_body(mut self, content_type: &str, body: impl Into<Bytes>) -> Self {
        self = self.with_header(http::header::CONTENT_TYPE.as_str(), content_type);
        self.body = body.into();
        self
    }

    /// Decoded query pairs, in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A validated protocol envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    /// Accepted transport verb
    pub http_method: HttpMethod,
    /// Dotted method identifier
    pub method: String,
    /// Requested method version
    pub version: String,
    /// Format string as supplied by the caller
    pub format: String,
    /// Extracted parameters, protocol fields removed
    pub params: Params,
}

impl RequestEnvelope {
    /// Negotiated wire format.
    pub fn wire_format(&self) -> WireFormat {
        WireFormat::negotiate(Some(&self.format))
    }
}
