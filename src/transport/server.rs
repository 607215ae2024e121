// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Listener loop and request/response conversion.

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::server::ServerConfig;
use crate::error::transport::TransportError;
use crate::protocol::catalog::ErrorKey;
use crate::protocol::classifier::{format_hint, query_params};
use crate::protocol::envelope::RawRequest;
use crate::protocol::formatter::{wrap_error, FormattedResponse, JSON_CONTENT_TYPE};
use crate::protocol::Dispatcher;

/// The gateway's HTTP server.
#[derive(Debug, Clone)]
pub struct RestServer {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl RestServer {
    /// Creates a server around a dispatcher.
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Binds the configured address, probing successive ports when it is taken.
    pub async fn bind(&self) -> Result<TcpListener, TransportError> {
        bind_with_fallback(self.config.address, self.config.port_fallback_attempts).await
    }

    /// Binds and serves until Ctrl-C.
    pub async fn run(self) -> Result<(), TransportError> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serves connections from `listener` until `shutdown` completes.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), TransportError>
    where
        F: Future<Output = ()>,
    {
        let local = listener.local_addr()?;
        info!(
            server = %self.config.name,
            address = %local,
            prefix = %self.dispatcher.classifier().prefix(),
            "REST gateway listening"
        );

        tokio::pin!(shutdown);
        loop {
            let (stream, peer) = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        // Per-connection accept failures (e.g. EMFILE) must not stop the server.
                        warn!(error = %TransportError::Accept(e), "Failed to accept connection");
                        continue;
                    }
                },
            };
            debug!(peer = %peer, "New connection");

            let dispatcher = Arc::clone(&self.dispatcher);
            let max_body_size = self.config.max_body_size;
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| handle_request(req, Arc::clone(&dispatcher), max_body_size));

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(peer = %peer, error = %err, "Connection closed with error");
                }
            });
        }

        Ok(())
    }
}

/// Binds `address`, or when its port is in use, one of the following
/// `attempts - 1` ports.
///
/// Port 0 asks the OS for any free port and is bound once.
pub async fn bind_with_fallback(address: SocketAddr, attempts: u16) -> Result<TcpListener, TransportError> {
    let attempts = if address.port() == 0 { 1 } else { attempts.max(1) };
    let mut last_error = None;

    for offset in 0..attempts {
        let Some(port) = address.port().checked_add(offset) else {
            break;
        };
        let candidate = SocketAddr::new(address.ip(), port);

        match TcpListener::bind(candidate).await {
            Ok(listener) => {
                if offset > 0 {
                    warn!(requested = %address, bound = %candidate, "Configured port in use, bound fallback port");
                }
                return Ok(listener);
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                debug!(address = %candidate, "Port in use");
                last_error = Some(e);
            }
            Err(source) => {
                return Err(TransportError::Bind {
                    address,
                    attempts: offset + 1,
                    source,
                })
            }
        }
    }

    Err(TransportError::Bind {
        address,
        attempts,
        source: last_error.unwrap_or_else(|| io::Error::new(io::ErrorKind::AddrInUse, "no port available")),
    })
}

async fn handle_request(
    req: Request<Incoming>,
    dispatcher: Arc<Dispatcher>,
    max_body_size: usize,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let mut raw = RawRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body: Bytes::new(),
    };

    let formatted = match Limited::new(body, max_body_size).collect().await {
        Ok(collected) => {
            raw.body = collected.to_bytes();
            dispatcher.handle(raw.clone()).await
        }
        Err(e) => {
            let error = if e.downcast_ref::<LengthLimitError>().is_some() {
                TransportError::BodyTooLarge(max_body_size)
            } else {
                TransportError::Body(e.to_string())
            };
            warn!(error = %error, path = %raw.path, "Rejecting request body");
            wrap_error(ErrorKey::SystemBusy, format_hint(&query_params(&raw)))
        }
    };

    info!(
        verb = %raw.method,
        path = %raw.path,
        bytes = formatted.body.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request served"
    );
    Ok(build_response(formatted))
}

/// Builds the HTTP response for a formatted body. The status is always 200.
pub fn build_response(formatted: FormattedResponse) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, formatted.content_type.as_str());
    if let Some(name) = &formatted.attachment {
        builder = builder.header(CONTENT_DISPOSITION, content_disposition(name));
    }

    builder.body(Full::new(formatted.body)).unwrap_or_else(|e| {
        error!(error = %e, "Failed to build response");
        let mut response = Response::new(Full::new(Bytes::from(
            ErrorKey::SystemBusy.to_value().to_string(),
        )));
        response
            .headers_mut()
            .insert(CONTENT_TYPE, http::HeaderValue::from_static(JSON_CONTENT_TYPE));
        response
    })
}

/// `attachment` disposition with an ASCII fallback name and an RFC 5987 UTF-8 name.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanaiConfig;
    use crate::protocol::formatter::Reply;
    use crate::protocol::handler::{handler_fn, MethodHandlerFn};
    use crate::registry::{Component, ComponentKind, ComponentTree, MethodTable, RegistryIndex};
    use std::any::Any;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    struct Ping;

    impl Component for Ping {
        fn exports(self: Arc<Self>) -> Vec<(&'static str, MethodHandlerFn)> {
            vec![(
                "ping",
                handler_fn(|_ctx, params| async move { Ok(Reply::Value(serde_json::Value::Object(params))) }),
            )]
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn server(max_body_size: usize) -> RestServer {
        let mut tree = ComponentTree::default();
        tree.insert(ComponentKind::Controller, "C_Ping", Arc::new(Ping));
        let table = MethodTable::builder().bind("net", "1.0", "net.ping", "C_Ping.ping").build();
        let mut config = LanaiConfig::default();
        config.server.max_body_size = max_body_size;

        let dispatcher = Dispatcher::from_config(&config, Arc::new(RegistryIndex::bind(tree, &table)));
        RestServer::new(config.server, dispatcher)
    }

    async fn exchange(server: RestServer, request: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = stopped.await;
                })
                .await
        });

        let mut stream = TcpStream::connect(address).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        // The server may close before draining an oversized body.
        let _ = stream.read_to_end(&mut response).await;

        stop.send(()).unwrap();
        task.await.unwrap().unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_get_round_trip() {
        let response = exchange(
            server(1024),
            "GET /router/rest?method=net.ping&v=1.0&format=json&n=1 HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n"
                .to_string(),
        )
        .await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("content-type: application/json; charset=utf-8"));
        assert!(response.ends_with(r#"{"n":"1"}"#));
    }

    #[tokio::test]
    async fn test_errors_are_status_200() {
        let response = exchange(
            server(1024),
            "DELETE /router/rest?method=net.ping&v=1.0&format=json HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n"
                .to_string(),
        )
        .await;

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with(r#"{"errcode":"-1","errmsg":"system is busy, please try again later"}"#));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let body = format!(r#"{{"method":"net.ping","v":"1.0","format":"json","pad":"{}"}}"#, "x".repeat(256));
        let request = format!(
            "POST /router/rest HTTP/1.1\r\nhost: localhost\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let response = exchange(server(64), request).await;
        assert!(response.contains(r#""errcode":"-1""#));
    }

    #[tokio::test]
    async fn test_port_fallback() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = taken.local_addr().unwrap();

        match bind_with_fallback(address, 1).await {
            Err(TransportError::Bind { attempts, .. }) => assert_eq!(attempts, 1),
            other => panic!("expected bind failure, got {other:?}"),
        }

        if let Ok(listener) = bind_with_fallback(address, 20).await {
            assert!(listener.local_addr().unwrap().port() > address.port());
        }
    }

    #[test]
    fn test_attachment_header() {
        let response = build_response(FormattedResponse {
            content_type: "application/pdf".to_string(),
            body: Bytes::from_static(b"%PDF"),
            attachment: Some("résumé \"v2\".pdf".to_string()),
        });
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"r_sum_ _v2_.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9%20%22v2%22.pdf"
        );
    }
}
