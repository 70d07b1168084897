//! Sensor drivers

pub mod hcsr04;
pub mod heading;
pub mod mpu6050;
pub mod reflectance;

pub use heading::HeadingIntegrator;
pub use mpu6050::{GyroAxis, Mpu6050};
pub use reflectance::{AdcReader, ReflectanceCalibration, ReflectanceSensor};
