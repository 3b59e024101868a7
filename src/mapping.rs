//! Metric mapping table
//!
//! [`METRICS`] is the contract between the router's field names and the
//! exposed metric names. Rules are evaluated in table order.

use crate::carrier::Arity;
use crate::snapshot::Group;
use crate::snapshot::Group::{DeviceInformation, Notifications, TrafficStatistics};

/// Metric carrying the scrape wall-clock time
pub const TIMESTAMP_METRIC: &str = "start_time";
pub const TIMESTAMP_HELP: &str = "Wall-clock time of the scrape in seconds since the epoch";

/// Info metric built from device information
pub const DEVICE_INFO_METRIC: &str = "wwan_device_info";
pub const DEVICE_INFO_HELP: &str = "Some general infos";

/// Label name and source field of each `wwan_device_info` label
pub const DEVICE_INFO_LABELS: &[(&str, &str)] = &[
    ("device_name", "DeviceName"),
    ("spreadname_en", "spreadname_en"),
    ("hardware_version", "HardwareVersion"),
    ("software_version", "SoftwareVersion"),
];

/// How a rule turns its source field into observations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One unlabeled observation
    Scalar,
    /// Multi-value field; each key becomes the `metric` label
    Keyed,
    /// Multi-value field; each key is parsed into carrier (and code) labels
    Carrier(Arity),
}

impl Shape {
    pub fn label_names(&self) -> &'static [&'static str] {
        match self {
            Shape::Scalar => &[],
            Shape::Keyed => &["metric"],
            Shape::Carrier(Arity::Carrier) => &["carrier"],
            Shape::Carrier(Arity::CarrierCode) => &["carrier", "code"],
        }
    }
}

/// One row of the mapping table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRule {
    pub group: Group,
    pub field: &'static str,
    pub name: &'static str,
    pub help: &'static str,
    /// Unit suffix stripped before parsing
    pub unit: Option<&'static str>,
    /// Extra scale applied on top of the unit table
    pub multiplier: f64,
    pub shape: Shape,
}

impl MetricRule {
    const fn new(
        group: Group,
        field: &'static str,
        name: &'static str,
        help: &'static str,
        shape: Shape,
    ) -> Self {
        Self {
            group,
            field,
            name,
            help,
            unit: None,
            multiplier: 1.0,
            shape,
        }
    }

    const fn scalar(group: Group, field: &'static str, name: &'static str, help: &'static str) -> Self {
        Self::new(group, field, name, help, Shape::Scalar)
    }

    const fn signal(field: &'static str, name: &'static str, help: &'static str) -> Self {
        Self::scalar(Group::Signal, field, name, help)
    }

    const fn keyed(field: &'static str, name: &'static str, help: &'static str) -> Self {
        Self::new(Group::Signal, field, name, help, Shape::Keyed)
    }

    const fn carrier(field: &'static str, name: &'static str, help: &'static str, arity: Arity) -> Self {
        Self::new(Group::Signal, field, name, help, Shape::Carrier(arity))
    }

    const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    const fn times(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Unit string passed to the normalizer, empty when none
    pub fn unit_str(&self) -> &'static str {
        match self.unit {
            Some(unit) => unit,
            None => "",
        }
    }
}

/// Every metric derived from the snapshot, in exposition order
#[rustfmt::skip]
pub const METRICS: &[MetricRule] = &[
    // Traffic statistics
    MetricRule::scalar(TrafficStatistics, "CurrentConnectTime", "wwan_traffic_stats_current_connect_time", "The length of the current connection in seconds"),
    MetricRule::scalar(TrafficStatistics, "CurrentDownload", "wwan_traffic_stats_current_download", "The volume of downloaded data during the current connection in Bytes"),
    MetricRule::scalar(TrafficStatistics, "CurrentDownloadRate", "wwan_traffic_stats_current_download_rate", "The current download rate in Bytes per Second"),
    MetricRule::scalar(TrafficStatistics, "CurrentUpload", "wwan_traffic_stats_current_upload", "The volume of uploaded data during the current connection in Bytes"),
    MetricRule::scalar(TrafficStatistics, "CurrentUploadRate", "wwan_traffic_stats_current_upload_rate", "The current upload rate in Bytes per Second"),
    MetricRule::scalar(TrafficStatistics, "TotalConnectTime", "wwan_traffic_stats_total_connect_time", "The total time connected in seconds"),
    MetricRule::scalar(TrafficStatistics, "TotalDownload", "wwan_traffic_stats_total_download", "The total volume of downloaded data in Bytes"),
    MetricRule::scalar(TrafficStatistics, "TotalUpload", "wwan_traffic_stats_total_upload", "The total volume of uploaded data in Bytes"),
    // Notifications
    MetricRule::scalar(Notifications, "SmsStorageFull", "wwan_notifications_sms_storage_full", "Whether the SMS storage is full"),
    MetricRule::scalar(Notifications, "UnreadMessage", "wwan_notifications_sms_unread_messages", "Number of unread SMS"),
    // Device information
    MetricRule::scalar(DeviceInformation, "uptime", "wwan_router_uptime", "The Router Uptime in seconds"),
    MetricRule::scalar(DeviceInformation, "Mccmnc", "wwan_router_mcc_mnc", "MCC (Mobile Country Code) and MNC (Mobile Network Code)"),
    // Cell
    MetricRule::signal("enodeb_id", "wwan_signal_enodeb_id", "The enodeb_id"),
    MetricRule::signal("cell_id", "wwan_signal_cell_id", "The Cell ID"),
    MetricRule::signal("band", "wwan_signal_band", "The Band"),
    MetricRule::keyed("arfcn", "wwan_signal_arfcn", "The GSM Absolute Radio Frequency Channel Number"),
    // LTE / UMTS radio
    MetricRule::signal("rsrp", "wwan_signal_rsrp", "The average power received from a single Reference signal in dBm").unit("dBm"),
    MetricRule::signal("rsrq", "wwan_signal_rsrq", "Indicates quality of the received signal in dB").unit("dB"),
    MetricRule::signal("rssi", "wwan_signal_rssi", "Represents the entire received power including the wanted power from the serving cell as well as all co-channel power and other sources of noise in dBm").unit("dBm"),
    MetricRule::signal("rscp", "wwan_signal_rscp", "Denotes the power measured by a receiver on a particular physical communication channel in dBm").unit("dBm"),
    MetricRule::signal("sinr", "wwan_signal_sinr", "The signal-to-noise ratio of the given signal in dB").unit("dB"),
    MetricRule::signal("ecio", "wwan_signal_ecio", "The EC/IO is a measure of the quality/cleanliness of the signal from the tower to the modem and indicates the signal-to noise ratio in dB").unit("dB"),
    MetricRule::signal("cqi0", "wwan_signal_cqi0", "The Channel Quality Indicator 0."),
    MetricRule::signal("cqi1", "wwan_signal_cqi1", "The Channel Quality Indicator 1."),
    MetricRule::signal("dlbandwidth", "wwan_signal_downlink_bandwidth", "The Downlink Bandwidth in Hz").unit("MHz"),
    MetricRule::signal("dlfrequency", "wwan_signal_downlink_frequency", "The Downlink Frequency in Hz").unit("kHz"),
    MetricRule::signal("ulbandwidth", "wwan_signal_uplink_bandwidth", "The Uplink Bandwidth in Hz").unit("MHz"),
    MetricRule::signal("ulfrequency", "wwan_signal_uplink_frequency", "The Uplink Frequency in Hz").unit("kHz"),
    MetricRule::carrier("dl_mcs", "wwan_signal_downlink_mcs", "The Downlink Modulation and Coding Scheme per carrier and codeword", Arity::CarrierCode),
    MetricRule::carrier("ul_mcs", "wwan_signal_uplink_mcs", "The Uplink Modulation and Coding Scheme per carrier", Arity::Carrier),
    MetricRule::keyed("txpower", "wwan_signal_tx_power", "value in dBm").unit("dBm"),
    // ltedlfreq/lteulfreq are reported in 100 kHz steps
    MetricRule::signal("ltedlfreq", "wwan_lte_signal_downlink_frequency", "The LTE Downlink Frequency in Hz").unit("kHz").times(100.0),
    MetricRule::signal("lteulfreq", "wwan_lte_signal_uplink_frequency", "The LTE Uplink Frequency in Hz").unit("kHz").times(100.0),
    MetricRule::keyed("earfcn", "wwan_signal_earfcn", "The LTE Absolute Radio Frequency Channel Number"),
    // 5G NR radio
    MetricRule::signal("nrrsrp", "wwan_nr_signal_rsrp", "The average power received from a single Reference 5G NR signal in dBm").unit("dBm"),
    MetricRule::signal("nrrsrq", "wwan_nr_signal_rsrq", "Indicates quality of the received 5G NR signal in dB").unit("dB"),
    MetricRule::signal("nrsinr", "wwan_nr_signal_sinr", "The signal-to-noise ratio of the given 5G NR signal in dB").unit("dB"),
    MetricRule::signal("nrcqi0", "wwan_nr_signal_cqi0", "The 5G NR Channel Quality Indicator 0."),
    MetricRule::signal("nrcqi1", "wwan_nr_signal_cqi1", "The 5G NR Channel Quality Indicator 1."),
    MetricRule::signal("nrdlbandwidth", "wwan_nr_signal_downlink_bandwidth", "The 5G NR Downlink Bandwidth in Hz").unit("MHz"),
    MetricRule::signal("nrdlfreq", "wwan_nr_signal_downlink_frequency", "The 5G NR Downlink Frequency in Hz").unit("kHz"),
    // Uplink values come from the nrul* fields, not the LTE ul* ones
    MetricRule::signal("nrulbandwidth", "wwan_nr_signal_uplink_bandwidth", "The 5G NR Uplink Bandwidth in Hz").unit("MHz"),
    MetricRule::signal("nrulfreq", "wwan_nr_signal_uplink_frequency", "The 5G NR Uplink Frequency in Hz").unit("kHz"),
    MetricRule::carrier("nrdlmcs", "wwan_nr_signal_downlink_mcs", "The 5G NR Downlink Modulation and Coding Scheme per carrier and codeword", Arity::CarrierCode),
    MetricRule::carrier("nrulmcs", "wwan_nr_signal_uplink_mcs", "The 5G NR Uplink Modulation and Coding Scheme per carrier", Arity::Carrier),
    MetricRule::keyed("nrtxpower", "wwan_nr_signal_tx_power", "value in dBm").unit("dBm"),
    MetricRule::keyed("nrearfcn", "wwan_nr_signal_earfcn", "The 5G NR Absolute Radio Frequency Channel Number"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rule(name: &str) -> Option<&'static MetricRule> {
        METRICS.iter().find(|rule| rule.name == name)
    }

    #[test]
    fn test_metric_names_unique() {
        let mut names = HashSet::new();
        names.insert(TIMESTAMP_METRIC);
        names.insert(DEVICE_INFO_METRIC);
        for rule in METRICS {
            assert!(names.insert(rule.name), "duplicate metric {}", rule.name);
        }
    }

    #[test]
    fn test_every_rule_has_help() {
        for rule in METRICS {
            assert!(!rule.help.is_empty(), "{} has no help text", rule.name);
            assert!(rule.multiplier > 0.0);
        }
    }

    #[test]
    fn test_rule_lookup() {
        let rsrp = rule("wwan_signal_rsrp").unwrap();
        assert_eq!(rsrp.field, "rsrp");
        assert_eq!(rsrp.unit_str(), "dBm");
        assert_eq!(rsrp.shape, Shape::Scalar);

        let lte = rule("wwan_lte_signal_downlink_frequency").unwrap();
        assert_eq!(lte.multiplier, 100.0);

        assert!(rule("wwan_unknown").is_none());
    }

    #[test]
    fn test_nr_uplink_reads_nr_fields() {
        assert_eq!(rule("wwan_nr_signal_uplink_bandwidth").unwrap().field, "nrulbandwidth");
        assert_eq!(rule("wwan_nr_signal_uplink_frequency").unwrap().field, "nrulfreq");
        assert_eq!(rule("wwan_signal_uplink_bandwidth").unwrap().field, "ulbandwidth");
    }

    #[test]
    fn test_label_names() {
        assert!(Shape::Scalar.label_names().is_empty());
        assert_eq!(Shape::Keyed.label_names(), &["metric"]);
        assert_eq!(
            Shape::Carrier(Arity::CarrierCode).label_names(),
            &["carrier", "code"]
        );
    }
}
