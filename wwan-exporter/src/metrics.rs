// WWAN Exporter - Prometheus metrics sink
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus exposition of assembled observations.
//!
//! Every scrape gets a fresh [`Registry`]: the label sets of multi-value
//! metrics change with the radio state, and a carrier that disappeared must
//! not linger with its last value.

use std::collections::HashMap;

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use wwan::Observation;

use crate::error::Result;

/// Content type of the text exposition format
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

/// Encode observations to Prometheus text format.
///
/// Families are registered in first-seen order; all observations of one
/// name must share the same label names.
pub fn encode_observations(observations: &[Observation]) -> Result<String> {
    let registry = Registry::new();
    let mut families: HashMap<&'static str, GaugeVec> = HashMap::new();

    for observation in observations {
        if !families.contains_key(observation.name) {
            let vec = GaugeVec::new(
                Opts::new(observation.name, observation.help),
                &observation.label_names(),
            )?;
            registry.register(Box::new(vec.clone()))?;
            families.insert(observation.name, vec);
        }
        families[observation.name]
            .get_metric_with_label_values(&observation.label_values())?
            .set(observation.value);
    }

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use wwan::{assemble_at, DeviceSnapshot};

    fn sample(output: &str, series: &str) -> Option<f64> {
        output
            .lines()
            .filter(|line| !line.starts_with('#'))
            .find_map(|line| line.strip_prefix(series)?.strip_prefix(' '))
            .and_then(|value| value.trim().parse().ok())
    }

    #[test]
    fn test_encode_assembly() {
        let mut snapshot = DeviceSnapshot::default();
        snapshot.signal.insert("rsrp", "-90dBm");
        snapshot.signal.insert("arfcn", "pcc:100 scc1:200");
        snapshot.signal.insert("dl_mcs", "mcsDownCarrier1Code0:5");
        snapshot.device_information.insert("DeviceName", "B535-232");

        let assembly = assemble_at(&snapshot, 1_700_000_000.0);
        let output = encode_observations(&assembly.observations).unwrap();

        assert!(output.contains("# HELP wwan_signal_rsrp "));
        assert!(output.contains("# TYPE wwan_signal_rsrp gauge"));
        assert!(output.contains("wwan_signal_rsrp -90"));
        assert!(output.contains(r#"wwan_signal_arfcn{metric="pcc"} 100"#));
        assert!(output.contains(r#"wwan_signal_arfcn{metric="scc1"} 200"#));
        assert!(output.contains(r#"wwan_signal_downlink_mcs{carrier="1",code="0"} 5"#));
        assert!(output.contains(r#"device_name="B535-232""#));
        assert!(output.contains("start_time"));
    }

    #[test]
    fn test_scaled_values_exposed() {
        let mut snapshot = DeviceSnapshot::default();
        snapshot.signal.insert("dlfrequency", "1865000kHz");
        snapshot.signal.insert("ltedlfreq", "18650");
        snapshot.signal.insert("rsrq", "-11.5dB");

        let output = encode_observations(&assemble_at(&snapshot, 0.0).observations).unwrap();

        assert_relative_eq!(
            sample(&output, "wwan_signal_downlink_frequency").unwrap(),
            1.865e9
        );
        assert_relative_eq!(
            sample(&output, "wwan_lte_signal_downlink_frequency").unwrap(),
            1.865e9
        );
        assert_relative_eq!(sample(&output, "wwan_signal_rsrq").unwrap(), -11.5);
    }

    #[test]
    fn test_registry_is_per_scrape() {
        let mut snapshot = DeviceSnapshot::default();
        snapshot.signal.insert("txpower", "PPusch:23dBm");
        let first = encode_observations(&assemble_at(&snapshot, 0.0).observations).unwrap();
        assert!(first.contains("PPusch"));

        let second =
            encode_observations(&assemble_at(&DeviceSnapshot::default(), 0.0).observations)
                .unwrap();
        assert!(!second.contains("PPusch"));
    }

    #[test]
    fn test_label_mismatch_is_an_error() {
        let observations = vec![
            Observation {
                name: "wwan_test",
                help: "test",
                labels: vec![("metric", "a".to_string())],
                value: 1.0,
            },
            Observation {
                name: "wwan_test",
                help: "test",
                labels: vec![],
                value: 2.0,
            },
        ];
        assert!(encode_observations(&observations).is_err());
    }

    #[test]
    fn test_content_type() {
        assert!(content_type().starts_with("text/plain"));
    }
}
