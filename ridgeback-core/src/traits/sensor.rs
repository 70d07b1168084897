//! Sensor readings and sensor errors

/// Sensor identifier, used in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorId {
    /// Left reflectance sensor
    ReflectanceLeft,
    /// Right reflectance sensor
    ReflectanceRight,
    /// Orientation (gyro) sensor
    Gyro,
    /// Range (ultrasonic) sensor
    Range,
}

/// Errors that can occur when sampling sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Device did not respond
    Unavailable(SensorId),
    /// Last good sample is too old to trust
    Stale(SensorId),
    /// Reading outside the physically possible range
    OutOfRange(SensorId),
}

/// Raw sensor values sampled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReadings {
    /// Reflected light, left then right (percent, 0-100)
    pub reflectance: [u8; 2],
    /// Cumulative orientation (degrees, not yet baseline-corrected)
    pub gyro_angle: i32,
    /// Distance to the nearest object (millimetres)
    pub range_mm: u16,
}

/// Everything the controller sees in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorFrame {
    /// Sensor values
    pub readings: SensorReadings,
    /// Left wheel position in the current encoder reference frame
    pub left_pos: i32,
    /// Right wheel position in the current encoder reference frame
    pub right_pos: i32,
}
