//! RP2040 board: the robot's hardware behind the controller traits
//!
//! Motors are driven from the control task. `update_drives()` closes the
//! wheel loops and refreshes every output; it runs once per tick before
//! the controller samples positions.

use core::cell::RefCell;

use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::pwm::PwmOutput;
use embassy_time::Instant;
use embedded_hal::pwm::SetDutyCycle;
use portable_atomic::{AtomicI32, Ordering};

use ridgeback_core::traits::clock::elapsed_ms;
use ridgeback_core::traits::{
    Actuator, ActuatorError, Clock, MotorId, Platform, SensorError, SensorId, SensorReadings,
};
use ridgeback_drivers::motor::{EncoderMotor, HBridge, ServoGripper};
use ridgeback_drivers::sensor::{AdcReader, ReflectanceSensor};

use crate::channels::{GYRO_ANGLE, GYRO_FAULT, GYRO_STAMP_MS, RANGE_MM, RANGE_STAMP_MS};

/// Gyro sample age treated as stale (ms)
const GYRO_STALE_MS: u32 = 100;
/// Ranging cycle age treated as stale (ms)
const RANGE_STALE_MS: u32 = 250;

/// Milliseconds since boot, truncated like the controller clock
pub fn uptime_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Controller clock on the embassy time driver
pub struct EmbassyClock {
    start: Instant,
}

impl EmbassyClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// One ADC input sharing the converter
pub struct AdcPin {
    adc: &'static RefCell<Adc<'static, adc::Blocking>>,
    channel: Channel<'static>,
}

impl AdcPin {
    pub fn new(
        adc: &'static RefCell<Adc<'static, adc::Blocking>>,
        channel: Channel<'static>,
    ) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for AdcPin {
    fn read(&mut self) -> Result<u16, ()> {
        self.adc
            .borrow_mut()
            .blocking_read(&mut self.channel)
            .map_err(|_| ())
    }
}

/// Traction wheel: encoder loop plus bridge
pub struct Wheel {
    motor: EncoderMotor,
    bridge: HBridge<PwmOutput<'static>, PwmOutput<'static>>,
    count: &'static AtomicI32,
}

impl Wheel {
    pub fn new(
        motor: EncoderMotor,
        bridge: HBridge<PwmOutput<'static>, PwmOutput<'static>>,
        count: &'static AtomicI32,
    ) -> Self {
        Self {
            motor,
            bridge,
            count,
        }
    }

    fn update(&mut self, dt_ms: u32) -> Result<(), ActuatorError> {
        let duty = self.motor.update(self.count.load(Ordering::Relaxed), dt_ms);
        self.bridge.drive(self.motor.mode(), duty)
    }
}

/// Gripper servo and its signal pin
pub struct Gripper {
    servo: ServoGripper,
    pwm: PwmOutput<'static>,
}

impl Gripper {
    /// The signal starts off so the servo stays limp until commanded
    pub fn new(servo: ServoGripper, mut pwm: PwmOutput<'static>) -> Result<Self, ActuatorError> {
        pwm.set_duty_cycle_fully_off()
            .map_err(|_| ActuatorError::Fault)?;
        Ok(Self { servo, pwm })
    }

    fn update(&mut self, dt_ms: u32) -> Result<(), ActuatorError> {
        let result = match self.servo.update(dt_ms) {
            // PWM runs at 1 µs per count
            Some(pulse_us) => self.pwm.set_duty_cycle(pulse_us),
            None => self.pwm.set_duty_cycle_fully_off(),
        };
        result.map_err(|_| ActuatorError::Fault)
    }
}

/// The robot's hardware
pub struct Board {
    reflectance: [ReflectanceSensor<AdcPin>; 2],
    left: Wheel,
    right: Wheel,
    gripper: Gripper,
    last_update_ms: u32,
}

impl Board {
    pub fn new(
        reflectance: [ReflectanceSensor<AdcPin>; 2],
        left: Wheel,
        right: Wheel,
        gripper: Gripper,
    ) -> Self {
        Self {
            reflectance,
            left,
            right,
            gripper,
            last_update_ms: uptime_ms(),
        }
    }

    /// Close the wheel loops and refresh all outputs
    pub fn update_drives(&mut self) -> Result<(), ActuatorError> {
        let now = uptime_ms();
        let dt_ms = elapsed_ms(now, self.last_update_ms);
        self.last_update_ms = now;

        self.left.update(dt_ms)?;
        self.right.update(dt_ms)?;
        self.gripper.update(dt_ms)
    }
}

fn check_fresh(stamp: u32, max_age_ms: u32, id: SensorId) -> Result<(), SensorError> {
    if elapsed_ms(uptime_ms(), stamp) > max_age_ms {
        return Err(SensorError::Stale(id));
    }
    Ok(())
}

impl Platform for Board {
    fn read_sensors(&mut self) -> Result<SensorReadings, SensorError> {
        let left = self.reflectance[0].read_percent()?;
        let right = self.reflectance[1].read_percent()?;

        if GYRO_FAULT.load(Ordering::Relaxed) {
            return Err(SensorError::Unavailable(SensorId::Gyro));
        }
        check_fresh(
            GYRO_STAMP_MS.load(Ordering::Relaxed),
            GYRO_STALE_MS,
            SensorId::Gyro,
        )?;
        check_fresh(
            RANGE_STAMP_MS.load(Ordering::Relaxed),
            RANGE_STALE_MS,
            SensorId::Range,
        )?;

        Ok(SensorReadings {
            reflectance: [left, right],
            gyro_angle: GYRO_ANGLE.load(Ordering::Relaxed),
            range_mm: RANGE_MM.load(Ordering::Relaxed),
        })
    }

    fn actuator(&mut self, id: MotorId) -> &mut dyn Actuator {
        match id {
            MotorId::Left => &mut self.left.motor,
            MotorId::Right => &mut self.right.motor,
            MotorId::Gripper => &mut self.gripper.servo,
        }
    }
}

