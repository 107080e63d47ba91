//! Pump actuator adapters.
//!
//! - [`LogActuator`]: logs pump transitions; used when no relay is wired.
//! - [`PinActuator`]: drives a relay through any `embedded-hal`
//!   [`OutputPin`].  A relay is on/off only, so the duty is logged but
//!   not modulated.

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::app::ports::{ActuatorPort, PumpCommand};
use crate::error::ActuatorError;

/// Records the last command and logs changes.
#[derive(Debug, Default)]
pub struct LogActuator {
    last: Option<PumpCommand>,
    applied: u64,
}

impl LogActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<PumpCommand> {
        self.last
    }

    /// Commands applied so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }
}

impl ActuatorPort for LogActuator {
    fn apply_pump(&mut self, cmd: PumpCommand) {
        if self.last != Some(cmd) {
            info!(
                "Pump: {} duty={}%",
                if cmd.on { "ON" } else { "OFF" },
                cmd.duty_percent
            );
        }
        self.last = Some(cmd);
        self.applied += 1;
    }
}

/// Relay driven by a single active-high GPIO.
pub struct PinActuator<P: OutputPin> {
    pin: P,
    energised: Option<bool>,
    write_failures: u32,
}

impl<P: OutputPin> PinActuator<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            energised: None,
            write_failures: 0,
        }
    }

    /// Drive the pin, writing only on change.
    pub fn try_apply(&mut self, cmd: PumpCommand) -> Result<(), ActuatorError> {
        if self.energised == Some(cmd.on) {
            return Ok(());
        }
        let written = if cmd.on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        written.map_err(|_| ActuatorError::PinWriteFailed)?;
        self.energised = Some(cmd.on);
        Ok(())
    }

    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ActuatorPort for PinActuator<P> {
    fn apply_pump(&mut self, cmd: PumpCommand) {
        if let Err(e) = self.try_apply(cmd) {
            self.write_failures = self.write_failures.saturating_add(1);
            warn!("Pump: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    #[derive(Default)]
    struct FakePin {
        high: bool,
        writes: u32,
        broken: bool,
    }

    #[derive(Debug)]
    struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    impl ErrorType for FakePin {
        type Error = PinFault;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), PinFault> {
            if self.broken {
                return Err(PinFault);
            }
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), PinFault> {
            if self.broken {
                return Err(PinFault);
            }
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn writes_only_on_change() {
        let mut act = PinActuator::new(FakePin::default());
        act.apply_pump(PumpCommand::new(true, 75));
        act.apply_pump(PumpCommand::new(true, 50));
        act.apply_pump(PumpCommand::OFF);
        let pin = act.into_inner();
        assert!(!pin.high);
        assert_eq!(pin.writes, 2);
    }

    #[test]
    fn failed_write_is_counted_and_retried() {
        let mut act = PinActuator::new(FakePin {
            broken: true,
            ..FakePin::default()
        });
        act.apply_pump(PumpCommand::new(true, 75));
        assert_eq!(act.write_failures(), 1);
        assert_eq!(act.try_apply(PumpCommand::new(true, 75)), Err(ActuatorError::PinWriteFailed));
    }

    #[test]
    fn log_actuator_tracks_last_command() {
        let mut act = LogActuator::new();
        act.apply_pump(PumpCommand::new(true, 40));
        act.stop_pump();
        assert_eq!(act.last(), Some(PumpCommand::OFF));
        assert_eq!(act.applied(), 2);
    }
}
