// Copyright (c) 2025 Lanai Rest Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Canonical error catalog.
//!
//! Every caller-visible failure of the gateway is one of the entries below. The
//! entries are rendered as `{"errcode": "<code>", "errmsg": "<message>"}` in the
//! negotiated wire format. Codes and messages are kept byte-for-byte compatible
//! with existing clients, including their original wording.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A single `(code, message)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorEntry {
    /// Caller-visible error code
    pub code: &'static str,
    /// Human readable message
    pub message: &'static str,
}

impl ErrorEntry {
    /// Renders the entry as an `{errcode, errmsg}` JSON object.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "errcode": self.code,
            "errmsg": self.message,
        })
    }
}

impl Serialize for ErrorEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("errcode", self.code)?;
        map.serialize_entry("errmsg", self.message)?;
        map.end()
    }
}

macro_rules! catalog {
    ($( $(#[$doc:meta])* $key:ident => ($code:literal, $message:literal), )+) => {
        /// Symbolic keys into the error catalog.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorKey {
            $( $(#[$doc])* $key, )+
        }

        impl ErrorKey {
            /// Every key, in catalog order.
            pub const ALL: &'static [ErrorKey] = &[ $( ErrorKey::$key, )+ ];

            /// Returns the catalog entry for this key.
            pub const fn entry(self) -> ErrorEntry {
                match self {
                    $( ErrorKey::$key => ErrorEntry { code: $code, message: $message }, )+
                }
            }
        }
    };
}

catalog! {
    /// Success marker, never produced by the dispatcher itself.
    Success => ("0", "succeed"),
    /// Generic catch-all for transport-shape errors and handler failures.
    SystemBusy => ("-1", "system is busy, please try again later"),
    /// Generic throttling response.
    TooFrequent => ("-2", "Sorry, request are too frequent, please try again later"),
    InvalidToken => ("100100", "invalid token"),
    InvalidParameter => ("100101", "invalid parameter"),
    InvalidVersion => ("100102", "invalid version"),
    /// Shared by unknown namespace, unknown version and unknown leaf.
    InvalidMethod => ("100103", "invalid method"),
    InvalidUrl => ("100104", "invalid url"),
    InvalidFormat => ("100105", "invalid format"),
    MissingToken => ("100106", "missing is token"),
    MissingVersion => ("100107", "missing is version"),
    MissingMethod => ("100108", "missing is method"),
    MissingUrl => ("100109", "missing is url"),
    MissingFields => ("100110", "missing is fields"),
    MissingFormat => ("100111", "missing is format"),
    CodeError => ("100112", "code is error"),
    CodeExpired => ("100113", "code expires"),
    MissingSignature => ("100114", "missing signature"),
    MissingNonce => ("100115", "missing noncestr"),
    MissingTimestamp => ("100116", "missing timestamp"),
    InvalidSignature => ("100117", "invalid signature"),
    TokenExpired => ("100118", "token expires"),
    RequireGet => ("100200", "require get method"),
    RequirePost => ("100201", "require post method"),
    RequirePut => ("100202", "require put method"),
    RequireDelete => ("100203", "require delete method"),
    RequireOptions => ("100204", "require options method"),
    RequireHead => ("100205", "require head method"),
    RequirePatch => ("100206", "require patch protocol"),
    RequireTrace => ("100207", "require trace protocol"),
    RequireConnect => ("100208", "require connect protocol"),
    RequireHttps => ("100209", "require https protocol"),
    DataEmpty => ("100300", "data is empty"),
    /// Payload could not be parsed as JSON or XML.
    MalformedPayload => ("100400", "parsing json/xml is error"),
    UnauthorizedApi => ("100500", "api is unauthorized"),
    DateFormat => ("100501", "date format error"),
    AccountDisabled => ("100502", "account has been disabled"),
    AccountExists => ("100503", "account exists"),
    AccountMissing => ("100504", "account does not exist"),
    WrongPassword => ("100505", "error password"),
    DataExists => ("200100", "data exists"),
}

impl ErrorKey {
    /// Caller-visible code of this key.
    pub fn code(self) -> &'static str {
        self.entry().code
    }

    /// Human readable message of this key.
    pub fn message(self) -> &'static str {
        self.entry().message
    }

    /// Looks a key up by its caller-visible code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.code() == code)
    }

    /// Renders the key's entry as an `{errcode, errmsg}` JSON object.
    pub fn to_value(self) -> Value {
        self.entry().to_value()
    }
}

impl std::fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

/// Returns true when `value` is an object carrying an `errcode` that belongs to
/// the catalog and is not the success marker.
pub fn carries_error_code(value: &Value) -> bool {
    value
        .get("errcode")
        .and_then(Value::as_str)
        .and_then(ErrorKey::from_code)
        .is_some_and(|key| key != ErrorKey::Success)
}
