// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Render options and their query-string flattening.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::render::RenderError;
use crate::protocol::envelope::Params;

/// Output value selecting PDF rendering; anything else is a screenshot.
pub const OUTPUT_PDF: &str = "pdf";

/// Browser viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_scale_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mobile: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_touch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_landscape: Option<bool>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1200,
            device_scale_factor: None,
            is_mobile: None,
            has_touch: None,
            is_landscape: None,
        }
    }
}

/// Navigation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GotoOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    pub wait_until: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_idle_inflight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_idle_timeout: Option<u64>,
}

impl Default for GotoOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            wait_until: "networkidle2".to_string(),
            network_idle_inflight: None,
            network_idle_timeout: None,
        }
    }
}

/// Page margins, as CSS lengths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
}

/// PDF output options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PdfOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_header_footer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_template: Option<String>,
    #[serde(default)]
    pub landscape: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_ranges: Option<String>,
    /// Paper format; cleared when both `width` and `height` are given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default)]
    pub margin: Margin,
    pub print_background: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            scale: None,
            display_header_footer: None,
            footer_template: None,
            header_template: None,
            landscape: false,
            page_ranges: None,
            format: Some("A4".to_string()),
            width: None,
            height: None,
            margin: Margin::default(),
            print_background: true,
        }
    }
}

/// Screenshot clip rectangle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Clip {
    /// True when no coordinate is set.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.width.is_none() && self.height.is_none()
    }
}

/// Screenshot output options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenshotOptions {
    pub full_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Clip::is_empty")]
    pub clip: Clip,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omit_background: Option<bool>,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            full_page: true,
            quality: None,
            kind: "png".to_string(),
            clip: Clip::default(),
            omit_background: None,
        }
    }
}

/// Everything the external renderer needs to produce a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
    pub scroll_page: bool,
    pub emulate_screen_media: bool,
    pub ignore_https_errors: bool,
    pub wait_for: i64,
    pub output: String,
    pub viewport: Viewport,
    pub goto: GotoOptions,
    pub pdf: PdfOptions,
    pub screenshot: ScreenshotOptions,
    /// `"all"` or `"page"` to fail on failed sub-requests or a failed main request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_early: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            url: None,
            html: None,
            attachment_name: None,
            scroll_page: false,
            emulate_screen_media: true,
            ignore_https_errors: false,
            wait_for: 0,
            output: OUTPUT_PDF.to_string(),
            viewport: Viewport::default(),
            goto: GotoOptions::default(),
            pdf: PdfOptions::default(),
            screenshot: ScreenshotOptions::default(),
            fail_early: None,
        }
    }
}

/// Last value per key of a flattened query.
struct Flat(HashMap<String, String>);

impl Flat {
    fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.0.get(key).and_then(|v| v.trim().parse().ok())
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.0
            .get(key)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
    }
}

impl RenderOptions {
    /// Builds options from flattened `key=value` pairs, on top of the defaults.
    ///
    /// Nested options use dotted keys: `viewport.width`, `goto.waitUntil`,
    /// `pdf.margin.top`, `screenshot.clip.x` and so on. Unparseable numbers are
    /// ignored, except `waitFor` which becomes 0.
    pub fn from_query<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let q = Flat(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        let mut opts = Self::default();

        opts.url = q.text("url");
        opts.html = q.text("html");
        opts.attachment_name = q.text("attachmentName");
        opts.scroll_page = q.flag("scrollPage").unwrap_or(opts.scroll_page);
        opts.emulate_screen_media = q
            .flag("emulateScreenMedia")
            .unwrap_or(opts.emulate_screen_media);
        opts.ignore_https_errors = q
            .flag("ignoreHttpsErrors")
            .unwrap_or(opts.ignore_https_errors);
        opts.wait_for = q
            .0
            .get("waitFor")
            .map(|v| v.trim().parse::<f64>().map(|n| n.trunc() as i64).unwrap_or(0))
            .unwrap_or(0);
        opts.output = q.text("output").unwrap_or(opts.output);
        opts.fail_early = q.text("failEarly");

        let viewport = &mut opts.viewport;
        viewport.width = q.parse("viewport.width").unwrap_or(viewport.width);
        viewport.height = q.parse("viewport.height").unwrap_or(viewport.height);
        viewport.device_scale_factor = q.parse("viewport.deviceScaleFactor");
        viewport.is_mobile = q.flag("viewport.isMobile");
        viewport.has_touch = q.flag("viewport.hasTouch");
        viewport.is_landscape = q.flag("viewport.isLandscape");

        let goto = &mut opts.goto;
        goto.timeout = q.parse("goto.timeout");
        goto.wait_until = q.text("goto.waitUntil").unwrap_or(goto.wait_until.clone());
        goto.network_idle_inflight = q.parse("goto.networkIdleInflight");
        goto.network_idle_timeout = q.parse("goto.networkIdleTimeout");

        let pdf = &mut opts.pdf;
        pdf.scale = q.parse("pdf.scale");
        pdf.display_header_footer = q.flag("pdf.displayHeaderFooter");
        pdf.footer_template = q.text("pdf.footerTemplate");
        pdf.header_template = q.text("pdf.headerTemplate");
        pdf.landscape = q.flag("pdf.landscape").unwrap_or(pdf.landscape);
        pdf.page_ranges = q.text("pdf.pageRanges");
        pdf.format = q.text("pdf.format").or(pdf.format.take());
        pdf.width = q.text("pdf.width");
        pdf.height = q.text("pdf.height");
        pdf.margin = Margin {
            top: q.text("pdf.margin.top"),
            right: q.text("pdf.margin.right"),
            bottom: q.text("pdf.margin.bottom"),
            left: q.text("pdf.margin.left"),
        };
        pdf.print_background = q
            .flag("pdf.printBackground")
            .unwrap_or(pdf.print_background);
        if pdf.width.is_some() && pdf.height.is_some() {
            pdf.format = None;
        }

        let screenshot = &mut opts.screenshot;
        screenshot.full_page = q
            .flag("screenshot.fullPage")
            .unwrap_or(screenshot.full_page);
        screenshot.quality = q.parse("screenshot.quality");
        screenshot.kind = q.text("screenshot.type").unwrap_or(screenshot.kind.clone());
        screenshot.clip = Clip {
            x: q.parse("screenshot.clip.x"),
            y: q.parse("screenshot.clip.y"),
            width: q.parse("screenshot.clip.width"),
            height: q.parse("screenshot.clip.height"),
        };
        screenshot.omit_background = q.flag("screenshot.omitBackground");

        opts
    }

    /// Reads options back from dispatch parameters.
    pub fn from_params(params: &Params) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(params.clone()))
    }

    /// Options as dispatch parameters.
    pub fn to_params(&self) -> Params {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Params::new(),
        }
    }

    /// Whether a PDF, rather than a screenshot, is requested.
    pub fn is_pdf(&self) -> bool {
        self.output == OUTPUT_PDF
    }

    /// MIME type of the rendered document.
    pub fn mime_type(&self) -> Result<&'static str, RenderError> {
        if self.is_pdf() {
            return Ok("application/pdf");
        }
        match self.screenshot.kind.as_str() {
            "png" => Ok("image/png"),
            "jpeg" => Ok("image/jpeg"),
            other => Err(RenderError::UnknownType(other.to_string())),
        }
    }
}
