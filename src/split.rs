//! Multi-value field splitting
//!
//! Per-carrier fields pack several values into one string, e.g.
//! `"pcc:10 scc1:5"` or `"mcsUpCarrier1:20 mcsUpCarrier2:18"`.

use crate::error::ParseError;

/// Ordered key/value pairs parsed from one multi-value field.
///
/// Keys keep first-seen order; a repeated key replaces the earlier value in
/// place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiValue {
    entries: Vec<(String, String)>,
}

impl MultiValue {
    fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Split a space-delimited `key:value` string.
///
/// Empty or absent input yields an empty result. Each token is split on its
/// first `:` only.
///
/// # Errors
///
/// Returns [`ParseError::MalformedToken`] for a token without `:`.
pub fn split(raw: Option<&str>) -> Result<MultiValue, ParseError> {
    let mut result = MultiValue::default();
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(result),
    };

    for token in raw.split(' ') {
        let (key, value) = token
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedToken {
                token: token.to_string(),
                raw: raw.to_string(),
            })?;
        result.insert(key, value);
    }

    Ok(result)
}
