//! Metric assembly
//!
//! [`assemble`] walks [`METRICS`](crate::mapping::METRICS) against a
//! [`DeviceSnapshot`] and produces the observations for one scrape. A field
//! that fails to parse costs only its own observation; the error is collected
//! in [`Assembly::errors`] and the walk continues.

use chrono::Utc;

use crate::carrier::{extract_carrier_code, Arity};
use crate::error::WwanError;
use crate::mapping::{
    MetricRule, Shape, DEVICE_INFO_HELP, DEVICE_INFO_LABELS, DEVICE_INFO_METRIC, METRICS,
    TIMESTAMP_HELP, TIMESTAMP_METRIC,
};
use crate::normalize::{normalize, normalize_field};
use crate::snapshot::DeviceSnapshot;
use crate::split::split;

/// One named, labeled value ready for the metrics sink
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

impl Observation {
    fn unlabeled(name: &'static str, help: &'static str, value: f64) -> Self {
        Self {
            name,
            help,
            labels: Vec::new(),
            value,
        }
    }

    /// Value of a label, if present
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn label_names(&self) -> Vec<&'static str> {
        self.labels.iter().map(|(k, _)| *k).collect()
    }

    pub fn label_values(&self) -> Vec<&str> {
        self.labels.iter().map(|(_, v)| v.as_str()).collect()
    }
}

/// A field that produced no observation
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Metric the field feeds
    pub metric: &'static str,
    /// Multi-value key, if the failure was per entry
    pub key: Option<String>,
    pub error: WwanError,
}

/// Result of one assembly pass
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub observations: Vec<Observation>,
    pub errors: Vec<FieldError>,
}

impl Assembly {
    /// All observations for one metric, in emission order
    pub fn by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Observation> + 'a {
        self.observations.iter().filter(move |o| o.name == name)
    }

    /// The first observation for a metric
    pub fn first(&self, name: &str) -> Option<&Observation> {
        self.observations.iter().find(|o| o.name == name)
    }

    fn fail(&mut self, rule: &MetricRule, key: Option<&str>, error: impl Into<WwanError>) {
        self.errors.push(FieldError {
            metric: rule.name,
            key: key.map(str::to_string),
            error: error.into(),
        });
    }
}

/// Assemble observations using the current wall-clock time.
pub fn assemble(snapshot: &DeviceSnapshot) -> Assembly {
    let now = Utc::now().timestamp_millis() as f64 / 1000.0;
    assemble_at(snapshot, now)
}

/// Assemble observations with an explicit scrape timestamp (epoch seconds).
pub fn assemble_at(snapshot: &DeviceSnapshot, timestamp: f64) -> Assembly {
    let mut assembly = Assembly::default();

    assembly
        .observations
        .push(Observation::unlabeled(TIMESTAMP_METRIC, TIMESTAMP_HELP, timestamp));

    let info = &snapshot.device_information;
    assembly.observations.push(Observation {
        name: DEVICE_INFO_METRIC,
        help: DEVICE_INFO_HELP,
        labels: DEVICE_INFO_LABELS
            .iter()
            .map(|(label, field)| (*label, info.text(field)))
            .collect(),
        value: 1.0,
    });

    for rule in METRICS {
        match rule.shape {
            Shape::Scalar => assemble_scalar(rule, snapshot, &mut assembly),
            Shape::Keyed | Shape::Carrier(_) => assemble_multi(rule, snapshot, &mut assembly),
        }
    }

    assembly
}

fn assemble_scalar(rule: &MetricRule, snapshot: &DeviceSnapshot, assembly: &mut Assembly) {
    let raw = snapshot.group(rule.group).get(rule.field);
    match normalize_field(raw, rule.unit_str(), rule.multiplier) {
        Ok(value) => assembly
            .observations
            .push(Observation::unlabeled(rule.name, rule.help, value)),
        Err(e) => assembly.fail(rule, None, e),
    }
}

fn assemble_multi(rule: &MetricRule, snapshot: &DeviceSnapshot, assembly: &mut Assembly) {
    let raw = snapshot.group(rule.group).get(rule.field).as_text();
    let values = match split(raw.as_deref()) {
        Ok(values) => values,
        Err(e) => return assembly.fail(rule, None, e),
    };

    for (key, raw_value) in values.iter() {
        let labels = match labels_for(rule.shape, key) {
            Ok(labels) => labels,
            Err(e) => {
                assembly.fail(rule, Some(key), e);
                continue;
            }
        };
        match normalize(Some(raw_value), rule.unit_str(), rule.multiplier) {
            Ok(value) => assembly.observations.push(Observation {
                name: rule.name,
                help: rule.help,
                labels,
                value,
            }),
            Err(e) => assembly.fail(rule, Some(key), e),
        }
    }
}

fn labels_for(shape: Shape, key: &str) -> Result<Vec<(&'static str, String)>, WwanError> {
    let names = shape.label_names();
    match shape {
        Shape::Scalar => Ok(Vec::new()),
        Shape::Keyed => Ok(vec![(names[0], key.to_string())]),
        Shape::Carrier(arity) => {
            let extracted = extract_carrier_code(key, arity)?;
            let mut labels = vec![(names[0], extracted.carrier)];
            if arity == Arity::CarrierCode {
                labels.push((names[1], extracted.code.unwrap_or_default()));
            }
            Ok(labels)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, ParseError};
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_snapshot_defaults_to_zero() {
        let assembly = assemble_at(&DeviceSnapshot::default(), 1_700_000_000.0);
        assert!(assembly.errors.is_empty());

        let scalars = METRICS.iter().filter(|r| r.shape == Shape::Scalar).count();
        // timestamp + device info + every scalar
        assert_eq!(assembly.observations.len(), 2 + scalars);
        assert_eq!(assembly.first("wwan_signal_rsrp").unwrap().value, 0.0);
        assert_eq!(assembly.first("start_time").unwrap().value, 1_700_000_000.0);
    }

    #[test]
    fn test_device_info_labels() {
        let mut snapshot = DeviceSnapshot::default();
        snapshot.device_information.insert("DeviceName", "B535-232");
        snapshot.device_information.insert("SoftwareVersion", "11.0.2.2");

        let assembly = assemble_at(&snapshot, 0.0);
        let info = assembly.first(DEVICE_INFO_METRIC).unwrap();
        assert_eq!(info.value, 1.0);
        assert_eq!(info.label("device_name"), Some("B535-232"));
        assert_eq!(info.label("software_version"), Some("11.0.2.2"));
        assert_eq!(info.label("hardware_version"), Some(""));
        assert_eq!(
            info.label_names(),
            vec!["device_name", "spreadname_en", "hardware_version", "software_version"]
        );
    }

    #[test]
    fn test_mcs_labels() {
        let mut snapshot = DeviceSnapshot::default();
        snapshot
            .signal
            .insert("dl_mcs", "mcsDownCarrier1Code0:5 mcsDownCarrier1Code1:7");
        snapshot.signal.insert("ul_mcs", "mcsUpCarrier1:20");

        let assembly = assemble_at(&snapshot, 0.0);
        let dl: Vec<_> = assembly.by_name("wwan_signal_downlink_mcs").collect();
        assert_eq!(dl.len(), 2);
        assert_eq!(dl[1].label_values(), vec!["1", "1"]);
        assert_relative_eq!(dl[1].value, 7.0);

        let ul = assembly.first("wwan_signal_uplink_mcs").unwrap();
        assert_eq!(ul.label_values(), vec!["1"]);
        assert_relative_eq!(ul.value, 20.0);
    }

    #[test]
    fn test_tx_power_strips_unit() {
        let mut snapshot = DeviceSnapshot::default();
        snapshot
            .signal
            .insert("txpower", "PPusch:23dBm PPucch:-2dBm PSrs:>=10dBm");

        let assembly = assemble_at(&snapshot, 0.0);
        let values: Vec<(String, f64)> = assembly
            .by_name("wwan_signal_tx_power")
            .map(|o| (o.label("metric").unwrap_or_default().to_string(), o.value))
            .collect();
        assert_eq!(
            values,
            vec![
                ("PPusch".to_string(), 23.0),
                ("PPucch".to_string(), -2.0),
                ("PSrs".to_string(), 10.0),
            ]
        );
    }

    #[test]
    fn test_field_errors_are_isolated() {
        let mut snapshot = DeviceSnapshot::default();
        snapshot.signal.insert("rsrp", "unknown");
        snapshot.signal.insert("rsrq", "-11dB");
        snapshot.signal.insert("earfcn", "DL:1300 UL");
        snapshot.signal.insert("ul_mcs", "mcsUpCarrier1:20 PCC:3");

        let assembly = assemble_at(&snapshot, 0.0);
        assert!(assembly.first("wwan_signal_rsrp").is_none());
        assert_relative_eq!(assembly.first("wwan_signal_rsrq").unwrap().value, -11.0);
        assert_eq!(assembly.by_name("wwan_signal_earfcn").count(), 0);
        assert_eq!(assembly.by_name("wwan_signal_uplink_mcs").count(), 1);

        assert_eq!(assembly.errors.len(), 3);
        assert!(matches!(
            assembly.errors[0].error,
            WwanError::Parse(ParseError::NotNumeric { .. })
        ));
        assert_eq!(assembly.errors[1].metric, "wwan_signal_uplink_mcs");
        assert_eq!(assembly.errors[1].key.as_deref(), Some("PCC"));
        assert!(matches!(
            assembly.errors[1].error,
            WwanError::Extraction(ExtractionError::NoMatch { .. })
        ));
        assert!(matches!(
            assembly.errors[2].error,
            WwanError::Parse(ParseError::MalformedToken { .. })
        ));
    }

    #[test]
    fn test_numeric_fields() {
        let mut snapshot = DeviceSnapshot::default();
        snapshot.traffic_statistics.insert("TotalDownload", 1024.0);
        snapshot.device_information.insert("Mccmnc", "26201");

        let assembly = assemble_at(&snapshot, 0.0);
        assert_relative_eq!(
            assembly.first("wwan_traffic_stats_total_download").unwrap().value,
            1024.0
        );
        assert_relative_eq!(assembly.first("wwan_router_mcc_mnc").unwrap().value, 26201.0);
    }
}
