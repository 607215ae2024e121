// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Response wrapping in the negotiated wire format.
//!
//! - `json`: the result as-is.
//! - `xml`: the result as a `<response>` document. Strings are CDATA sections,
//!   numbers and booleans plain text, arrays repeated elements, nulls empty elements.
//! - `binary`/`pdf`: raw payloads pass through; a result carrying a catalog error
//!   code falls back to the JSON wrapping.
//!
//! Unknown formats were already folded into `json` by [`WireFormat::negotiate`].

use bytes::Bytes;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use super::catalog::{carries_error_code, ErrorKey};
use super::envelope::WireFormat;

/// Content type of JSON responses.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
/// Content type of XML responses.
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
/// Content type of opaque binary responses without a more specific type.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Root element of XML responses.
const XML_ROOT: &str = "response";

/// What a dispatch produced, before wire formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A structured result or an `{errcode, errmsg}` envelope
    Value(Value),
    /// A raw payload with its content type, e.g. a rendered PDF
    Payload {
        /// MIME type of `data`
        content_type: String,
        /// Raw bytes
        data: Bytes,
        /// Download file name, sent as `Content-Disposition: attachment`
        attachment: Option<String>,
    },
}

impl Reply {
    /// Reply carrying a catalog entry.
    pub fn error(key: ErrorKey) -> Self {
        Self::Value(key.to_value())
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// A response body ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedResponse {
    /// `Content-Type` header value
    pub content_type: String,
    /// Encoded body
    pub body: Bytes,
    /// Download file name, if any
    pub attachment: Option<String>,
}

impl FormattedResponse {
    fn new(content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.to_string(),
            body: body.into(),
            attachment: None,
        }
    }

    /// Body as UTF-8 text, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Wraps a reply in the given wire format.
pub fn wrap(reply: Reply, format: WireFormat) -> FormattedResponse {
    match reply {
        Reply::Payload {
            content_type,
            data,
            attachment,
        } => FormattedResponse {
            content_type,
            body: data,
            attachment,
        },
        Reply::Value(value) => match format {
            WireFormat::Json => to_json(&value),
            WireFormat::Xml => to_xml(value),
            WireFormat::Binary | WireFormat::Pdf => to_binary(value),
        },
    }
}

/// Wraps a catalog entry in the given wire format.
pub fn wrap_error(key: ErrorKey, format: WireFormat) -> FormattedResponse {
    wrap(Reply::error(key), format)
}

fn to_json(value: &Value) -> FormattedResponse {
    match serde_json::to_vec(value) {
        Ok(body) => FormattedResponse::new(JSON_CONTENT_TYPE, body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode JSON response");
            FormattedResponse::new(
                JSON_CONTENT_TYPE,
                ErrorKey::SystemBusy.to_value().to_string(),
            )
        }
    }
}

fn to_xml(value: Value) -> FormattedResponse {
    let value = match value {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => parsed,
            Err(_) => ErrorKey::MalformedPayload.to_value(),
        },
        other => other,
    };

    let document = xml_document(&value)
        .or_else(|_| xml_document(&ErrorKey::MalformedPayload.to_value()));
    match document {
        Ok(body) => FormattedResponse::new(XML_CONTENT_TYPE, body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode XML response");
            to_json(&ErrorKey::SystemBusy.to_value())
        }
    }
}

fn to_binary(value: Value) -> FormattedResponse {
    if carries_error_code(&value) {
        return to_json(&value);
    }
    match value {
        Value::String(text) => FormattedResponse::new(OCTET_STREAM, text),
        other => FormattedResponse {
            content_type: OCTET_STREAM.to_string(),
            ..to_json(&other)
        },
    }
}

/// Errors raised while building an XML document.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// Only objects map onto a key/value element tree.
    #[error("XML responses require an object, got {0}")]
    NotAnObject(&'static str),

    /// A result key is not a valid element name.
    #[error("Key {0:?} is not a valid XML element name")]
    InvalidName(String),

    /// The writer failed.
    #[error("XML writer error: {0}")]
    Writer(#[from] quick_xml::Error),
}

/// Serializes an object into `<?xml …?><response>…</response>`.
pub fn xml_document(value: &Value) -> Result<Vec<u8>, XmlError> {
    let Value::Object(map) = value else {
        return Err(XmlError::NotAnObject(kind_name(value)));
    };

    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(XML_ROOT)))?;
    for (key, child) in map {
        write_field(&mut writer, key, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(XML_ROOT)))?;
    Ok(writer.into_inner())
}

fn write_field(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<(), XmlError> {
    if !is_element_name(name) {
        return Err(XmlError::InvalidName(name.to_string()));
    }
    match value {
        Value::Array(items) => {
            for item in items {
                write_field(writer, name, item)?;
            }
        }
        Value::Null => {
            writer.write_event(Event::Empty(BytesStart::new(name)))?;
        }
        Value::Object(map) => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            for (key, child) in map {
                write_field(writer, key, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Value::String(text) => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            write_cdata(writer, text)?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Value::Number(number) => {
            let text = number.to_string();
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(&text)))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Value::Bool(flag) => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(if *flag { "true" } else { "false" })))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
    }
    Ok(())
}

/// Writes `text` as CDATA, splitting around any `]]>` it contains.
fn write_cdata(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), XmlError> {
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;
    for (index, part) in parts.iter().enumerate() {
        let mut section = String::with_capacity(part.len() + 3);
        if index > 0 {
            section.push('>');
        }
        section.push_str(part);
        if index < last {
            section.push_str("]]");
        }
        writer.write_event(Event::CData(BytesCData::new(section)))?;
    }
    Ok(())
}

/// Whether `name` can be used verbatim as an element name.
fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

    #[test]
    fn test_xml_sample() {
        let response = wrap(json!({"a": 1, "b": "x"}).into(), WireFormat::Xml);
        assert_eq!(response.content_type, XML_CONTENT_TYPE);
        assert_eq!(
            response.text(),
            format!("{DECL}<response><a>1</a><b><![CDATA[x]]></b></response>")
        );
    }

    #[test]
    fn test_json_unchanged() {
        let value = json!({"a": 1, "b": "x"});
        let response = wrap(value.clone().into(), WireFormat::Json);
        assert_eq!(response.content_type, JSON_CONTENT_TYPE);
        assert_eq!(serde_json::from_slice::<Value>(&response.body).unwrap(), value);
        assert_eq!(response.text(), r#"{"a":1,"b":"x"}"#);
    }

    #[test]
    fn test_unknown_format_defaults_to_json() {
        let value = json!({"a": 1});
        let negotiated = WireFormat::negotiate(Some("csv"));
        assert_eq!(wrap(value.clone().into(), negotiated), wrap(value.into(), WireFormat::Json));
    }

    #[test]
    fn test_xml_parses_string_results() {
        let response = wrap(Reply::Value(json!(r#"{"n":2}"#)), WireFormat::Xml);
        assert_eq!(response.text(), format!("{DECL}<response><n>2</n></response>"));
    }

    #[test]
    fn test_xml_unparseable_string_reports_malformed_payload() {
        let response = wrap(Reply::Value(json!("plain words")), WireFormat::Xml);
        assert!(response.text().contains("<errcode><![CDATA[100400]]></errcode>"));
    }

    #[test]
    fn test_xml_nested_arrays_and_nulls() {
        let value = json!({
            "list": [1, 2],
            "inner": {"ok": true, "none": null},
            "tricky": "a]]>b & c"
        });
        let response = wrap(value.into(), WireFormat::Xml);
        assert_eq!(
            response.text(),
            format!(
                "{DECL}<response><list>1</list><list>2</list>\
                 <inner><ok>true</ok><none/></inner>\
                 <tricky><![CDATA[a]]]]><![CDATA[>b & c]]></tricky></response>"
            )
        );
    }

    #[test]
    fn test_xml_error_envelope() {
        let response = wrap_error(ErrorKey::InvalidMethod, WireFormat::Xml);
        assert_eq!(
            response.text(),
            format!(
                "{DECL}<response><errcode><![CDATA[100103]]></errcode>\
                 <errmsg><![CDATA[invalid method]]></errmsg></response>"
            )
        );
    }

    #[test]
    fn test_binary_passthrough() {
        let reply = Reply::Payload {
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4"),
            attachment: Some("report".to_string()),
        };
        let response = wrap(reply, WireFormat::Pdf);
        assert_eq!(response.content_type, "application/pdf");
        assert_eq!(&response.body[..], b"%PDF-1.4");
        assert_eq!(response.attachment.as_deref(), Some("report"));
    }

    #[test]
    fn test_binary_error_falls_back_to_json() {
        let response = wrap_error(ErrorKey::SystemBusy, WireFormat::Binary);
        assert_eq!(response.content_type, JSON_CONTENT_TYPE);
        assert_eq!(
            response.text(),
            r#"{"errcode":"-1","errmsg":"system is busy, please try again later"}"#
        );
    }

    #[test]
    fn test_binary_plain_value_is_streamed() {
        let response = wrap(Reply::Value(json!("raw text")), WireFormat::Binary);
        assert_eq!(response.content_type, OCTET_STREAM);
        assert_eq!(response.text(), "raw text");
    }

    #[test]
    fn test_xml_document_rejects_non_objects() {
        assert!(matches!(xml_document(&json!([1])), Err(XmlError::NotAnObject("an array"))));
    }

    #[test]
    fn test_xml_invalid_key_reports_malformed_payload() {
        for key in ["a b", "1x", "x<y", ""] {
            let mut map = serde_json::Map::new();
            map.insert(key.to_string(), json!(1));
            let response = wrap(Value::Object(map).into(), WireFormat::Xml);
            assert_eq!(
                response.text(),
                format!(
                    "{DECL}<response><errcode><![CDATA[100400]]></errcode>\
                     <errmsg><![CDATA[{}]]></errmsg></response>",
                    ErrorKey::MalformedPayload.message()
                ),
                "{key:?}"
            );
        }
    }

    #[test]
    fn test_xml_nested_invalid_key_is_rejected() {
        let value = json!({"outer": {"bad key": true}});
        assert!(matches!(xml_document(&value), Err(XmlError::InvalidName(name)) if name == "bad key"));
        assert!(xml_document(&json!({"ok_name-1.x": 1})).is_ok());
    }
}
