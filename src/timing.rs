//! Moving time and acceleration time of the time based motion profile.

use std::sync::Arc;
use tracing::debug;
use crate::arm_error::ArmError;
use crate::transport::{ArmTransport, ProfileRegister, RegisterWrite};

/// Durations in seconds. `accel_time` must not exceed half of `moving_time`; this is the
/// caller's responsibility and is not checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingProfile {
    /// Time it takes all joints of the group to complete one move.
    pub moving_time: f64,

    /// Time spent accelerating from and decelerating to rest.
    pub accel_time: f64,
}

impl Default for TimingProfile {
    fn default() -> Self {
        TimingProfile { moving_time: 2.0, accel_time: 0.3 }
    }
}

/// Milliseconds as written to the profile registers.
pub fn to_millis(seconds: f64) -> i32 {
    (seconds * 1000.0).round() as i32
}

/// Holds the current timing profile and mirrors changes to the drive registers. Writing the
/// same value again is a silent no-op, so the registers are not rewritten on every move.
pub struct TimingProfileManager {
    transport: Arc<dyn ArmTransport>,
    group: String,
    current: TimingProfile,
}

impl TimingProfileManager {
    /// The initial profile is assumed to be unknown to the drives; call
    /// [`TimingProfileManager::push_all`] to write it.
    pub fn new(transport: Arc<dyn ArmTransport>, group: &str, initial: TimingProfile) -> Self {
        TimingProfileManager { transport, group: group.to_string(), current: initial }
    }

    pub fn current(&self) -> TimingProfile {
        self.current
    }

    pub fn moving_time(&self) -> f64 {
        self.current.moving_time
    }

    pub fn accel_time(&self) -> f64 {
        self.current.accel_time
    }

    /// Update the profile. Only values that are given and differ from the current ones are
    /// written to the drives. A value is taken over only once its write succeeded, so after a
    /// failed write the current profile is still what the drives use.
    pub fn set(&mut self, moving_time: Option<f64>, accel_time: Option<f64>) -> Result<(), ArmError> {
        debug!("Updating timing params: moving_time={:?}, accel_time={:?}", moving_time, accel_time);
        if let Some(moving_time) = moving_time {
            if moving_time != self.current.moving_time {
                self.write(ProfileRegister::ProfileVelocity, moving_time)?;
                self.current.moving_time = moving_time;
            }
        }
        if let Some(accel_time) = accel_time {
            if accel_time != self.current.accel_time {
                self.write(ProfileRegister::ProfileAcceleration, accel_time)?;
                self.current.accel_time = accel_time;
            }
        }
        Ok(())
    }

    /// Unconditionally write both registers, used once at initialization.
    pub fn push_all(&mut self) -> Result<(), ArmError> {
        self.write(ProfileRegister::ProfileVelocity, self.current.moving_time)?;
        self.write(ProfileRegister::ProfileAcceleration, self.current.accel_time)
    }

    fn write(&self, register: ProfileRegister, seconds: f64) -> Result<(), ArmError> {
        self.transport.write_register(&RegisterWrite {
            group: self.group.clone(),
            register,
            value: to_millis(seconds),
        })
    }
}
