//! Analog reflectance sensor
//!
//! An IR emitter/phototransistor pair read through the ADC. The raw
//! reading is scaled to 0..=100 between two calibration points, so a dark
//! line reads low and bare track reads high.

use ridgeback_core::traits::{SensorError, SensorId};

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Raw readings over the two reference surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReflectanceCalibration {
    /// Raw reading over the line (0 %)
    pub dark_raw: u16,
    /// Raw reading over bare track (100 %)
    pub bright_raw: u16,
}

impl Default for ReflectanceCalibration {
    fn default() -> Self {
        // Phototransistor pulls the input low under strong reflection
        Self {
            dark_raw: 3600,
            bright_raw: 400,
        }
    }
}

/// Scale a raw reading to percent
///
/// Works for either polarity. Readings beyond a calibration point clamp.
pub fn raw_to_percent(raw: u16, calibration: &ReflectanceCalibration) -> u8 {
    let dark = calibration.dark_raw as i32;
    let span = calibration.bright_raw as i32 - dark;
    if span == 0 {
        return 0;
    }

    let percent = (raw as i32 - dark) * 100 / span;
    percent.clamp(0, 100) as u8
}

/// Reflectance sensor on one ADC channel
pub struct ReflectanceSensor<ADC> {
    adc: ADC,
    id: SensorId,
    calibration: ReflectanceCalibration,
}

impl<ADC: AdcReader> ReflectanceSensor<ADC> {
    pub fn new(adc: ADC, id: SensorId, calibration: ReflectanceCalibration) -> Self {
        Self {
            adc,
            id,
            calibration,
        }
    }

    /// Read reflectance in percent
    pub fn read_percent(&mut self) -> Result<u8, SensorError> {
        let raw = self
            .adc
            .read()
            .map_err(|_| SensorError::Unavailable(self.id))?;
        Ok(raw_to_percent(raw, &self.calibration))
    }
}
