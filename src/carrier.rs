//! Carrier/code label extraction
//!
//! MCS fields key their values by carrier and, for downlink, by codeword:
//! `mcsDownCarrier1Code0`, `mcsUpCarrier2`. The key is read as a sequence of
//! lowercase-letter runs each followed by digits.

use crate::error::ExtractionError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SEGMENT: Regex = Regex::new("([a-z]+)([0-9]+)").expect("static pattern");
}

/// Number of labels to derive from a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Carrier only (uplink MCS)
    Carrier,
    /// Carrier and codeword (downlink MCS)
    CarrierCode,
}

/// Labels derived from a multi-value key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierCode {
    pub carrier: String,
    pub code: Option<String>,
}

/// Derive the carrier (and code) labels from `key`.
///
/// With [`Arity::Carrier`] the first digit group names the carrier. With
/// [`Arity::CarrierCode`] the first two digit groups are carrier and code; a
/// key made of a single run such as `pcc0` yields its letters as carrier and
/// its digits as code.
///
/// # Errors
///
/// Returns [`ExtractionError`] if the key does not have the required shape.
pub fn extract_carrier_code(key: &str, arity: Arity) -> Result<CarrierCode, ExtractionError> {
    let segments: Vec<(&str, &str)> = SEGMENT
        .captures_iter(key)
        .filter_map(|caps| match (caps.get(1), caps.get(2)) {
            (Some(letters), Some(digits)) => Some((letters.as_str(), digits.as_str())),
            _ => None,
        })
        .collect();

    match (arity, segments.as_slice()) {
        (_, []) => Err(ExtractionError::NoMatch {
            key: key.to_string(),
        }),
        (Arity::Carrier, [(_, carrier), ..]) => Ok(CarrierCode {
            carrier: carrier.to_string(),
            code: None,
        }),
        (Arity::CarrierCode, [(letters, digits)]) => Ok(CarrierCode {
            carrier: letters.to_string(),
            code: Some(digits.to_string()),
        }),
        (Arity::CarrierCode, [(_, carrier), (_, code), ..]) => Ok(CarrierCode {
            carrier: carrier.to_string(),
            code: Some(code.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_run_carrier_code() {
        let labels = extract_carrier_code("pcc0", Arity::CarrierCode).unwrap();
        assert_eq!(labels.carrier, "pcc");
        assert_eq!(labels.code.as_deref(), Some("0"));
    }

    #[test]
    fn test_downlink_mcs_key() {
        let labels = extract_carrier_code("mcsDownCarrier1Code0", Arity::CarrierCode).unwrap();
        assert_eq!(labels.carrier, "1");
        assert_eq!(labels.code.as_deref(), Some("0"));
    }

    #[test]
    fn test_uplink_mcs_key() {
        let labels = extract_carrier_code("mcsUpCarrier2", Arity::Carrier).unwrap();
        assert_eq!(labels.carrier, "2");
        assert!(labels.code.is_none());

        let labels = extract_carrier_code("c1", Arity::Carrier).unwrap();
        assert_eq!(labels.carrier, "1");
    }

    #[test]
    fn test_malformed_keys() {
        for key in ["pcc", "", "123", "PCC1", "mcs-"] {
            let err = extract_carrier_code(key, Arity::CarrierCode).unwrap_err();
            assert_eq!(err, ExtractionError::NoMatch { key: key.to_string() });
        }
    }
}
