//! Device client abstraction
//!
//! The [`FetchCache`](crate::FetchCache) talks to the router only through
//! this trait, so the session protocol stays outside the core.

use crate::error::DeviceError;
use crate::snapshot::{DeviceSnapshot, Record};

/// Read access to the four record groups of a router
pub trait DeviceClient: Send {
    /// Radio state (`api/device/signal`)
    fn signal(&mut self) -> Result<Record, DeviceError>;

    /// Connection counters (`api/monitoring/traffic-statistics`)
    fn traffic_statistics(&mut self) -> Result<Record, DeviceError>;

    /// SMS notification state (`api/monitoring/check-notifications`)
    fn notifications(&mut self) -> Result<Record, DeviceError>;

    /// Identity and uptime (`api/device/information`)
    fn device_information(&mut self) -> Result<Record, DeviceError>;

    /// Read all four groups as one unit.
    ///
    /// The first failing read aborts the whole fetch. Implementations that
    /// need a session around the reads override this.
    fn fetch_snapshot(&mut self) -> Result<DeviceSnapshot, DeviceError> {
        Ok(DeviceSnapshot {
            signal: self.signal()?,
            traffic_statistics: self.traffic_statistics()?,
            notifications: self.notifications()?,
            device_information: self.device_information()?,
        })
    }
}

impl<T: DeviceClient + ?Sized> DeviceClient for Box<T> {
    fn signal(&mut self) -> Result<Record, DeviceError> {
        (**self).signal()
    }

    fn traffic_statistics(&mut self) -> Result<Record, DeviceError> {
        (**self).traffic_statistics()
    }

    fn notifications(&mut self) -> Result<Record, DeviceError> {
        (**self).notifications()
    }

    fn device_information(&mut self) -> Result<Record, DeviceError> {
        (**self).device_information()
    }

    fn fetch_snapshot(&mut self) -> Result<DeviceSnapshot, DeviceError> {
        (**self).fetch_snapshot()
    }
}
