pub mod bme680;
pub mod gps;
pub mod nmea;
pub mod synthetic;

use rakecore::{GpsFix, SensorSample};

/// One environmental sample per tick. Implementations must not block past
/// roughly one tick; a failed read is an error, not a hang.
pub trait SensorSource {
    fn sample(&mut self) -> anyhow::Result<SensorSample>;
}

/// Best-effort position per tick. `None` means no usable fix this tick,
/// which the logger records as empty GPS fields.
pub trait GpsSource {
    fn read_fix(&mut self) -> Option<GpsFix>;
}
