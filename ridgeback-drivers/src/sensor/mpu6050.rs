//! MPU-6050 gyroscope over I2C
//!
//! Only the gyroscope is used. The part is configured for the ±250 deg/s
//! range (131 LSB per deg/s) and read one axis at a time.

use embedded_hal::i2c::I2c;
use ridgeback_core::traits::{SensorError, SensorId};

/// Address with AD0 low
pub const DEFAULT_ADDRESS: u8 = 0x68;

const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_GYRO_XOUT_H: u8 = 0x43;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

const WHO_AM_I_VALUE: u8 = 0x68;
/// Wake, clock from the X gyro PLL
const PWR_CLOCK_PLL_X: u8 = 0x01;
/// ±250 deg/s full scale
const GYRO_FS_250: u8 = 0x00;
const LSB_PER_DPS: i32 = 131;

/// Gyro axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroAxis {
    X,
    Y,
    Z,
}

impl GyroAxis {
    fn register(self) -> u8 {
        REG_GYRO_XOUT_H
            + match self {
                GyroAxis::X => 0,
                GyroAxis::Y => 2,
                GyroAxis::Z => 4,
            }
    }
}

/// MPU-6050 gyro driver
pub struct Mpu6050<I2C> {
    i2c: I2C,
    address: u8,
    axis: GyroAxis,
}

impl<I2C: I2c> Mpu6050<I2C> {
    pub fn new(i2c: I2C, address: u8, axis: GyroAxis) -> Self {
        Self { i2c, address, axis }
    }

    /// Verify the part and configure the gyro
    pub fn init(&mut self) -> Result<(), SensorError> {
        let mut id = [0u8; 1];
        self.i2c
            .write_read(self.address, &[REG_WHO_AM_I], &mut id)
            .map_err(|_| SensorError::Unavailable(SensorId::Gyro))?;
        if id[0] != WHO_AM_I_VALUE {
            return Err(SensorError::Unavailable(SensorId::Gyro));
        }

        self.write_register(REG_PWR_MGMT_1, PWR_CLOCK_PLL_X)?;
        self.write_register(REG_GYRO_CONFIG, GYRO_FS_250)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|_| SensorError::Unavailable(SensorId::Gyro))
    }

    /// Raw rate sample for the configured axis
    pub fn read_rate_raw(&mut self) -> Result<i16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[self.axis.register()], &mut buf)
            .map_err(|_| SensorError::Stale(SensorId::Gyro))?;
        Ok(i16::from_be_bytes(buf))
    }

    /// Rate for the configured axis in millidegrees per second
    pub fn read_rate_mdps(&mut self) -> Result<i32, SensorError> {
        Ok(raw_to_mdps(self.read_rate_raw()?))
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

/// Convert a raw ±250 deg/s sample to millidegrees per second
pub fn raw_to_mdps(raw: i16) -> i32 {
    raw as i32 * 1000 / LSB_PER_DPS
}
