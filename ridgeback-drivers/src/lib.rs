//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the hardware boundary
//! defined in ridgeback-core, on top of `embedded-hal` traits:
//!
//! - Motors (encoder-feedback traction motor, H-bridge, servo gripper)
//! - Sensors (analog reflectance, MPU-6050 gyro, HC-SR04 ranging)

#![no_std]
#![deny(unsafe_code)]

pub mod motor;
pub mod sensor;
