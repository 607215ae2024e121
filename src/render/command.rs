// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Renderer backed by an external program.
//!
//! The program receives the render options as JSON on stdin and must write the
//! document bytes to stdout.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{RenderOptions, Renderer};
use crate::config::render::RenderConfig;
use crate::error::render::RenderError;

/// Runs a configured renderer executable for every render.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: Option<PathBuf>,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRenderer {
    /// Creates a renderer from configuration.
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    async fn render(&self, options: &RenderOptions) -> Result<Bytes, RenderError> {
        let Some(program) = &self.program else {
            return Err(RenderError::Unavailable);
        };
        if options.url.is_none() && options.html.is_none() {
            return Err(RenderError::MissingSource);
        }

        let input = serde_json::to_vec(options)
            .map_err(|e| RenderError::Process(std::io::Error::other(e)))?;

        tracing::trace!(program = %program.display(), output = %options.output, "Spawning renderer");
        let mut child = Command::new(program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Feed stdin while draining stdout; renderers may write before reading all input.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let exchange = async move {
            let (fed, output) = tokio::join!(feed, child.wait_with_output());
            let output = output?;
            match fed {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(e),
                _ => Ok(output),
            }
        };

        let output = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| RenderError::Timeout(self.timeout.as_millis() as u64))??;

        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::trace!(bytes = output.stdout.len(), "Renderer finished");
        Ok(Bytes::from(output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(program: Option<&str>, args: &[&str]) -> CommandRenderer {
        renderer_with_timeout(program, args, 5_000)
    }

    fn renderer_with_timeout(program: Option<&str>, args: &[&str], timeout_ms: u64) -> CommandRenderer {
        CommandRenderer::from_config(&RenderConfig {
            program: program.map(PathBuf::from),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout_ms,
        })
    }

    fn page() -> RenderOptions {
        RenderOptions {
            html: Some("<p>hi</p>".to_string()),
            ..RenderOptions::default()
        }
    }

    #[tokio::test]
    async fn test_unconfigured_renderer_is_unavailable() {
        let result = renderer(None, &[]).render(&page()).await;
        assert!(matches!(result, Err(RenderError::Unavailable)));
    }

    #[tokio::test]
    async fn test_source_required() {
        let result = renderer(Some("cat"), &[])
            .render(&RenderOptions::default())
            .await;
        assert!(matches!(result, Err(RenderError::MissingSource)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_program_output_is_returned() {
        let options = page();
        let bytes = renderer(Some("cat"), &[]).render(&options).await.unwrap();
        let echoed: RenderOptions = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(echoed, options);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program() {
        let result = renderer(Some("sh"), &["-c", "echo broken >&2; exit 3"])
            .render(&page())
            .await;
        match result {
            Err(RenderError::Failed { stderr, .. }) => assert_eq!(stderr, "broken"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_large_input_is_streamed_through() {
        let options = RenderOptions {
            html: Some("x".repeat(1_000_000)),
            ..RenderOptions::default()
        };
        let bytes = renderer_with_timeout(Some("cat"), &[], 10_000)
            .render(&options)
            .await
            .unwrap();
        let echoed: RenderOptions = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(echoed.html.map(|html| html.len()), Some(1_000_000));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stalled_renderer_times_out() {
        let options = RenderOptions {
            html: Some("x".repeat(1_000_000)),
            ..RenderOptions::default()
        };
        let result = renderer_with_timeout(Some("sleep"), &["30"], 200)
            .render(&options)
            .await;
        assert!(matches!(result, Err(RenderError::Timeout(200))));
    }
}
