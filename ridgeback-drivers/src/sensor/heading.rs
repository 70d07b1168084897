//! Angle from integrated gyro rate

/// Integrates a rate signal into an angle
///
/// Works in millidegrees internally so slow rates are not lost to
/// truncation at short sample periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeadingIntegrator {
    angle_udeg: i64,
    bias_mdps: i32,
}

impl HeadingIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zero-rate offset, measured with the robot at rest
    pub fn set_bias(&mut self, bias_mdps: i32) {
        self.bias_mdps = bias_mdps;
    }

    /// Average resting samples into the bias
    pub fn calibrate(&mut self, samples: &[i32]) {
        if samples.is_empty() {
            return;
        }
        let sum: i64 = samples.iter().map(|&s| s as i64).sum();
        self.bias_mdps = (sum / samples.len() as i64) as i32;
    }

    /// Accumulate one rate sample over `dt_ms`
    pub fn update(&mut self, rate_mdps: i32, dt_ms: u32) {
        let rate = (rate_mdps - self.bias_mdps) as i64;
        self.angle_udeg += rate * dt_ms as i64;
    }

    /// Angle in whole degrees, truncated toward zero
    pub fn angle_deg(&self) -> i32 {
        (self.angle_udeg / 1_000_000) as i32
    }

    pub fn reset(&mut self) {
        self.angle_udeg = 0;
    }
}
