// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Method resolution and invocation.
//!
//! The [`Dispatcher`] runs the full request pipeline: classify, authenticate,
//! resolve, invoke, format. Every failure along the way ends as a catalog
//! envelope in the best-known wire format; nothing propagates to the transport.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::auth::Authenticator;
use super::catalog::ErrorKey;
use super::classifier::{scalar_text, Classifier};
use super::envelope::{HttpMethod, Params, RawRequest, RequestEnvelope, WireFormat};
use super::formatter::{wrap, wrap_error, FormattedResponse, Reply};
use super::handler::{HandlerError, MethodContext};
use crate::config::LanaiConfig;
use crate::error::{ErrorContext, ErrorReporter, TracingErrorReporter};
use crate::registry::{BoundMethod, RegistryIndex};
use crate::render::RenderOptions;

/// Maximum number of method identifier segments that form a namespace key.
pub const MAX_NAMESPACE_SEGMENTS: usize = 4;

/// Finds the namespace a method identifier is filed under.
///
/// Candidates are the first 4, 3, 2 and 1 segments of the identifier, tried
/// longest first; the first one that exists in the index is the namespace.
pub fn namespace_key(index: &RegistryIndex, method: &str) -> Option<String> {
    let segments: Vec<&str> = method.split('.').take(MAX_NAMESPACE_SEGMENTS).collect();
    (1..=segments.len())
        .rev()
        .map(|len| segments[..len].join("."))
        .find(|candidate| index.has_namespace(candidate))
}

/// Resolves an envelope to its bound method.
///
/// Unknown namespace, unknown version and unknown leaf all report
/// [`ErrorKey::InvalidMethod`].
pub fn resolve<'a>(index: &'a RegistryIndex, envelope: &RequestEnvelope) -> Result<&'a BoundMethod, ErrorKey> {
    let namespace = namespace_key(index, &envelope.method).ok_or(ErrorKey::InvalidMethod)?;
    index
        .lookup(&namespace, &envelope.version, &envelope.method)
        .ok_or(ErrorKey::InvalidMethod)
}

/// Content type and attachment forced onto rendered payloads.
struct RenderTarget {
    content_type: &'static str,
    attachment: Option<String>,
}

/// Runs requests through the protocol pipeline against a registry.
#[derive(Clone)]
pub struct Dispatcher {
    classifier: Classifier,
    authenticator: Authenticator,
    index: Arc<RegistryIndex>,
    reporter: Arc<dyn ErrorReporter>,
}

impl Dispatcher {
    /// Creates a dispatcher from its parts, reporting failures through tracing.
    pub fn new(classifier: Classifier, authenticator: Authenticator, index: Arc<RegistryIndex>) -> Self {
        Self {
            classifier,
            authenticator,
            index,
            reporter: Arc::new(TracingErrorReporter::new()),
        }
    }

    /// Creates a dispatcher for the REST and security configuration.
    pub fn from_config(config: &LanaiConfig, index: Arc<RegistryIndex>) -> Self {
        Self::new(
            Classifier::new(&config.rest),
            Authenticator::new(&config.security),
            index,
        )
    }

    /// Replaces the error reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// The registry the dispatcher resolves against.
    pub fn index(&self) -> &RegistryIndex {
        &self.index
    }

    /// The classifier in use.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Handles one request and returns the formatted response body.
    #[tracing::instrument(skip_all, fields(verb = %raw.method, path = %raw.path))]
    pub async fn handle(&self, raw: RawRequest) -> FormattedResponse {
        let envelope = match self.classifier.classify(&raw).await {
            Ok(envelope) => envelope,
            Err(rejection) => {
                tracing::debug!(error = %rejection.key, "Request rejected");
                return wrap_error(rejection.key, rejection.format);
            }
        };
        let format = envelope.wire_format();
        tracing::trace!(
            method = %envelope.method,
            version = %envelope.version,
            params = %serde_json::Value::Object(envelope.params.clone()),
            "{} request",
            envelope.http_method.as_str()
        );

        if let Err(key) = self.authenticator.authenticate(&raw.headers) {
            tracing::debug!(error = %key, "Authentication failed");
            return wrap_error(key, format);
        }

        let bound = match resolve(&self.index, &envelope) {
            Ok(bound) => bound,
            Err(key) => {
                tracing::debug!(method = %envelope.method, version = %envelope.version, "Method not found");
                return wrap_error(key, format);
            }
        };

        let (params, render) = if format == WireFormat::Pdf {
            let options = RenderOptions::from_query(render_pairs(&raw, &envelope));
            let content_type = match options.mime_type() {
                Ok(content_type) => content_type,
                Err(e) => {
                    self.reporter.report(
                        ErrorContext::new(e, "dispatcher")
                            .with_details(format!("method {} v{}", envelope.method, envelope.version)),
                    );
                    return wrap_error(ErrorKey::SystemBusy, format);
                }
            };
            let target = RenderTarget {
                content_type,
                attachment: options.attachment_name.clone(),
            };
            (options.to_params(), Some(target))
        } else {
            (envelope.params, None)
        };
        let query = raw.query_pairs();

        let context = MethodContext {
            http_method: envelope.http_method,
            method: envelope.method,
            version: envelope.version,
            format,
            headers: raw.headers,
            query,
        };

        let reply = match (self.invoke(bound, context, params).await, render) {
            (Reply::Payload { data, attachment, .. }, Some(target)) => Reply::Payload {
                content_type: target.content_type.to_string(),
                data,
                attachment: target.attachment.or(attachment),
            },
            (reply, _) => reply,
        };
        wrap(reply, format)
    }

    /// Invokes a bound handler, turning every failure into a catalog reply.
    ///
    /// Catalog errors are returned as-is. Any other error or a panic is reported
    /// and answered with [`ErrorKey::SystemBusy`].
    pub async fn invoke(&self, bound: &BoundMethod, context: MethodContext, params: Params) -> Reply {
        let binding = &bound.binding;
        let call = async { bound.handler.handle(context, params).await };

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(reply)) => reply,
            Ok(Err(HandlerError::Catalog(key))) => Reply::error(key),
            Ok(Err(HandlerError::Failed(error))) => {
                self.reporter.report(
                    ErrorContext::new(error, "dispatcher")
                        .with_details(format!(
                            "method {} v{} -> {}",
                            binding.leaf_key, binding.version, binding.target_function_path
                        ))
                        .with_span_trace(),
                );
                Reply::error(ErrorKey::SystemBusy)
            }
            Err(panic) => {
                self.reporter.report(
                    ErrorContext::new(
                        anyhow::anyhow!("handler panicked: {}", panic_message(panic.as_ref())),
                        "dispatcher",
                    )
                    .with_details(format!(
                        "method {} v{} -> {}",
                        binding.leaf_key, binding.version, binding.target_function_path
                    ))
                    .with_span_trace(),
                );
                Reply::error(ErrorKey::SystemBusy)
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("classifier", &self.classifier)
            .field("authenticator", &self.authenticator)
            .field("methods", &self.index.len())
            .field("reporter", &self.reporter)
            .finish()
    }
}

/// Key/value pairs the render options are derived from: the query string, then on
/// POST the scalar body fields.
fn render_pairs(raw: &RawRequest, envelope: &RequestEnvelope) -> Vec<(String, String)> {
    let mut pairs = raw.query_pairs();
    if envelope.http_method == HttpMethod::Post {
        pairs.extend(
            envelope
                .params
                .iter()
                .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text))),
        );
    }
    pairs
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
