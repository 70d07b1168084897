//! Ridgeback - Line-Following Stair-Climbing Pickup Robot Firmware
//!
//! Main firmware binary for RP2040-based robot boards. Wires the board
//! hardware to the controller in `ridgeback-core` and spawns the sensor
//! and control tasks.
//!
//! Pin assignments:
//!
//! | Function            | Pins              |
//! |---------------------|-------------------|
//! | Ultrasonic trig/echo| GPIO2 / GPIO3     |
//! | Gyro I2C0 SDA/SCL   | GPIO4 / GPIO5     |
//! | Left encoder A/B    | GPIO10 / GPIO11   |
//! | Right encoder A/B   | GPIO12 / GPIO13   |
//! | Stop button         | GPIO15 (to GND)   |
//! | Left bridge IN1/IN2 | GPIO16 / GPIO17   |
//! | Right bridge IN1/IN2| GPIO18 / GPIO19   |
//! | Gripper servo       | GPIO22            |
//! | Reflectance L/R     | GPIO26 / GPIO27   |

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::pwm::{self, Pwm, PwmOutput};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ridgeback_core::traits::SensorId;
use ridgeback_drivers::motor::{
    EncoderMotor, EncoderMotorConfig, HBridge, ServoConfig, ServoGripper,
};
use ridgeback_drivers::sensor::mpu6050::DEFAULT_ADDRESS;
use ridgeback_drivers::sensor::{GyroAxis, Mpu6050, ReflectanceCalibration, ReflectanceSensor};

use crate::board::{AdcPin, Board, Gripper, Wheel};
use crate::channels::{LEFT_COUNT, RIGHT_COUNT};

mod board;
mod channels;
mod config;
mod tasks;

static ADC: StaticCell<RefCell<Adc<'static, adc::Blocking>>> = StaticCell::new();

/// Bridge PWM: 125 MHz / (250 * 1000) = 500 Hz
fn bridge_pwm_config() -> pwm::Config {
    let mut config = pwm::Config::default();
    config.top = 999;
    config.divider = 250.into();
    config
}

/// Servo PWM: 1 µs per count, 20 ms frame
fn servo_pwm_config() -> pwm::Config {
    let mut config = pwm::Config::default();
    config.top = 19_999;
    config.divider = 125.into();
    config
}

fn bridge_outputs(pwm: Pwm<'static>) -> Option<(PwmOutput<'static>, PwmOutput<'static>)> {
    match pwm.split() {
        (Some(a), Some(b)) => Some((a, b)),
        _ => None,
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Ridgeback firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // Reflectance sensors share the ADC
    let adc = ADC.init(RefCell::new(Adc::new_blocking(p.ADC, adc::Config::default())));
    let reflectance = [
        ReflectanceSensor::new(
            AdcPin::new(adc, Channel::new_pin(p.PIN_26, Pull::None)),
            SensorId::ReflectanceLeft,
            ReflectanceCalibration::default(),
        ),
        ReflectanceSensor::new(
            AdcPin::new(adc, Channel::new_pin(p.PIN_27, Pull::None)),
            SensorId::ReflectanceRight,
            ReflectanceCalibration::default(),
        ),
    ];

    // Traction motors
    let left_pwm = Pwm::new_output_ab(p.PWM_SLICE0, p.PIN_16, p.PIN_17, bridge_pwm_config());
    let right_pwm = Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_18, p.PIN_19, bridge_pwm_config());
    let (Some((l1, l2)), Some((r1, r2))) = (bridge_outputs(left_pwm), bridge_outputs(right_pwm))
    else {
        defmt::panic!("Bridge PWM channels unavailable");
    };
    let (left_bridge, right_bridge) = match (HBridge::new(l1, l2), HBridge::new(r1, r2)) {
        (Ok(left), Ok(right)) => (left, right),
        _ => defmt::panic!("Bridge init failed"),
    };
    let left = Wheel::new(
        EncoderMotor::new(EncoderMotorConfig::default()),
        left_bridge,
        &LEFT_COUNT,
    );
    let right = Wheel::new(
        EncoderMotor::new(EncoderMotorConfig::default()),
        right_bridge,
        &RIGHT_COUNT,
    );

    // Gripper servo
    let servo_pwm = Pwm::new_output_a(p.PWM_SLICE3, p.PIN_22, servo_pwm_config());
    let gripper = match servo_pwm.split() {
        (Some(out), _) => Gripper::new(ServoGripper::new(ServoConfig::default()), out),
        _ => defmt::panic!("Servo PWM channel unavailable"),
    };
    let gripper = unwrap!(gripper);

    let board = Board::new(reflectance, left, right, gripper);
    info!("Motors and reflectance sensors initialized");

    // Gyro on I2C0
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let gyro = Mpu6050::new(i2c, DEFAULT_ADDRESS, GyroAxis::Y);

    // Encoders
    let left_a = Input::new(p.PIN_10, Pull::Up);
    let left_b = Input::new(p.PIN_11, Pull::Up);
    let right_a = Input::new(p.PIN_12, Pull::Up);
    let right_b = Input::new(p.PIN_13, Pull::Up);

    // Ultrasonic ranger
    let trigger = Output::new(p.PIN_2, Level::Low);
    let echo = Input::new(p.PIN_3, Pull::None);

    let stop_button = Input::new(p.PIN_15, Pull::Up);

    unwrap!(spawner.spawn(tasks::estop_task(stop_button)));
    unwrap!(spawner.spawn(tasks::encoder_task(left_a, left_b, &LEFT_COUNT)));
    unwrap!(spawner.spawn(tasks::encoder_task(right_a, right_b, &RIGHT_COUNT)));
    unwrap!(spawner.spawn(tasks::gyro_task(gyro)));
    unwrap!(spawner.spawn(tasks::ranging_task(trigger, echo)));
    unwrap!(spawner.spawn(tasks::control_task(board, config)));

    info!("All tasks spawned, robot running");
}
