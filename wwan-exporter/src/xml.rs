// WWAN Exporter - Router API documents
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Flat XML documents of the Huawei web API.
//!
//! Every endpoint answers with either `<response>` holding one element per
//! field, or `<error>` holding a numeric `<code>`. Nested elements are
//! flattened; only leaf text is kept.

use lazy_static::lazy_static;
use regex::Regex;
use wwan::{DeviceError, Record};

lazy_static! {
    static ref ROOT: Regex =
        Regex::new(r"^\s*(?:<\?xml[^?]*\?>\s*)?<([A-Za-z_][\w.-]*)").expect("static pattern");
    static ref LEAF: Regex =
        Regex::new(r"<([A-Za-z_][\w.-]*)\s*(?:/>|>([^<]*)</([A-Za-z_][\w.-]*)\s*>)")
            .expect("static pattern");
}

/// Error code the router returns when the session expired
pub const ERROR_LOGIN_REQUIRED: u32 = 100003;
/// Error code for "system busy"
pub const ERROR_BUSY: u32 = 100004;
/// Error code for "already logged in"
pub const ERROR_ALREADY_LOGGED_IN: u32 = 108003;

/// Parse a response document into a record.
///
/// # Errors
///
/// An `<error>` document maps to the matching [`DeviceError`]; anything
/// else that is not a `<response>` is a protocol error.
pub fn parse_response(body: &str) -> Result<Record, DeviceError> {
    let root = ROOT
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| DeviceError::Protocol(format!("not an XML document: {}", preview(body))))?;

    let fields = leaves(body, root);
    match root {
        "response" => Ok(fields),
        "error" => {
            let code = fields.text("code");
            let code = code.trim().parse::<u32>().map_err(|_| {
                DeviceError::Protocol(format!("error document without code: {}", preview(body)))
            })?;
            Err(error_for(code, fields.text("message")))
        }
        other => Err(DeviceError::Protocol(format!(
            "unexpected root element <{}>",
            other
        ))),
    }
}

/// Map a router error code to a [`DeviceError`]
pub fn error_for(code: u32, message: String) -> DeviceError {
    match code {
        ERROR_LOGIN_REQUIRED => DeviceError::LoginRequired,
        ERROR_BUSY => DeviceError::Busy,
        108001 | 108002 | 108006 | 108007 => DeviceError::LoginFailed { code },
        125001..=125003 => DeviceError::Csrf { code },
        _ => DeviceError::Response { code, message },
    }
}

fn leaves(body: &str, root: &str) -> Record {
    let mut record = Record::new();
    for caps in LEAF.captures_iter(body) {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if name == root {
            // <response>OK</response> carries no fields
            continue;
        }
        match (caps.get(2), caps.get(3)) {
            (Some(text), Some(close)) if close.as_str() == name => {
                let text = unescape(text.as_str());
                if text.is_empty() {
                    record.insert(name, wwan::FieldValue::Null);
                } else {
                    record.insert(name, text);
                }
            }
            (None, None) => record.insert(name, wwan::FieldValue::Null),
            _ => {}
        }
    }
    record
}

/// Build a `<request>` document from field/value pairs
pub fn request(fields: &[(&str, &str)]) -> String {
    let mut body = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><request>"#);
    for (name, value) in fields {
        body.push_str(&format!("<{0}>{1}</{0}>", name, escape(value)));
    }
    body.push_str("</request>");
    body
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn preview(body: &str) -> String {
    body.chars().take(64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wwan::FieldValue;

    const SIGNAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
<pci>289</pci>
<cell_id>27454722</cell_id>
<rsrp>-90dBm</rsrp>
<sinr>&gt;=30dB</sinr>
<rscp></rscp>
<ecio/>
<arfcn>pcc:100 scc1:200</arfcn>
</response>"#;

    #[test]
    fn test_parse_signal() {
        let record = parse_response(SIGNAL).unwrap();
        assert_eq!(record.text("rsrp"), "-90dBm");
        assert_eq!(record.text("sinr"), ">=30dB");
        assert_eq!(record.text("arfcn"), "pcc:100 scc1:200");
        assert!(record.get("rscp").is_null());
        assert!(record.contains("ecio"));
        assert!(record.get("ecio").is_null());
        assert_eq!(record.len(), 7);
    }

    #[test]
    fn test_parse_ok_response() {
        let record = parse_response("<response>OK</response>").unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_parse_error_codes() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?><error><code>100003</code><message></message></error>"#;
        assert_eq!(parse_response(body).unwrap_err(), DeviceError::LoginRequired);

        let body = "<error><code>125002</code><message/></error>";
        assert_eq!(
            parse_response(body).unwrap_err(),
            DeviceError::Csrf { code: 125002 }
        );

        let body = "<error><code>9003</code><message>nope</message></error>";
        assert_eq!(
            parse_response(body).unwrap_err(),
            DeviceError::Response {
                code: 9003,
                message: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_response("<html><body>login</body></html>"),
            Err(DeviceError::Protocol(_))
        ));
        assert!(matches!(parse_response(""), Err(DeviceError::Protocol(_))));
    }

    #[test]
    fn test_nested_elements_flattened() {
        let record =
            parse_response("<response><Messages><Count>2</Count></Messages></response>").unwrap();
        assert_eq!(record.get("Count"), &FieldValue::Text("2".to_string()));
        assert!(!record.contains("Messages"));
    }

    #[test]
    fn test_request_escapes_values() {
        let body = request(&[("Username", "admin"), ("Password", "a<b&c")]);
        assert!(body.starts_with("<?xml"));
        assert!(body.contains("<Username>admin</Username>"));
        assert!(body.contains("<Password>a&lt;b&amp;c</Password>"));
        assert!(body.ends_with("</request>"));
    }
}
