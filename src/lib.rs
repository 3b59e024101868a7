//! # WWAN - Huawei LTE/5G router metrics
//!
//! Fetch, cache and normalize the radio, traffic and notification state of a
//! Huawei LTE/5G router so it can be exposed as Prometheus gauges.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wwan::{Collector, DeviceClient, DeviceError, FetchCache, Record};
//!
//! struct StaticRouter;
//!
//! impl DeviceClient for StaticRouter {
//!     fn signal(&mut self) -> Result<Record, DeviceError> {
//!         Ok([("rsrp", "-90dBm"), ("arfcn", "pcc:100 scc1:200")].into_iter().collect())
//!     }
//!     fn traffic_statistics(&mut self) -> Result<Record, DeviceError> {
//!         Ok(Record::new())
//!     }
//!     fn notifications(&mut self) -> Result<Record, DeviceError> {
//!         Ok(Record::new())
//!     }
//!     fn device_information(&mut self) -> Result<Record, DeviceError> {
//!         Ok(Record::new())
//!     }
//! }
//!
//! let collector = Collector::new(Arc::new(FetchCache::new(StaticRouter)));
//! let assembly = collector.collect();
//!
//! assert_eq!(assembly.first("wwan_signal_rsrp").unwrap().value, -90.0);
//! assert_eq!(assembly.by_name("wwan_signal_arfcn").count(), 2);
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! scrape ──▶ Collector ──▶ FetchCache ──(every ≥4s)──▶ DeviceClient
//!                │               │
//!                │          DeviceSnapshot
//!                ▼               │
//!            assemble ◀──────────┘
//!                │  normalize / split / extract_carrier_code
//!                ▼
//!          Vec<Observation> ──▶ metrics sink
//! ```
//!
//! ## Modules
//!
//! - [`normalize`]: unit stripping and scaling
//! - [`split`]: multi-value `key:value` fields
//! - [`carrier`]: carrier/code labels from MCS keys
//! - [`cache`]: time-gated fetch cache
//! - [`mapping`]: the static metric table
//! - [`assembler`]: snapshot to observations
//! - [`config`]: `config.ini` and environment settings

pub mod assembler;
pub mod cache;
pub mod carrier;
pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod mapping;
pub mod normalize;
pub mod snapshot;
pub mod split;

// Re-exports for convenient access
pub use assembler::{assemble, assemble_at, Assembly, FieldError, Observation};
pub use cache::{FetchCache, Refresh, DEFAULT_MIN_INTERVAL};
pub use carrier::{extract_carrier_code, Arity, CarrierCode};
pub use client::DeviceClient;
pub use collector::Collector;
pub use config::Settings;
pub use error::{ConfigError, DeviceError, ExtractionError, ParseError, Result, WwanError};
pub use mapping::{MetricRule, Shape, METRICS};
pub use normalize::{normalize, normalize_field};
pub use snapshot::{DeviceSnapshot, FieldValue, Group, Record};
pub use split::{split, MultiValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
