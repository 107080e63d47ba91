//! Application core: pure domain logic, zero I/O.
//!
//! Business rules of the irrigation controller: per-tick sensor update,
//! hysteresis pump decision, history recording and telemetry channel
//! bookkeeping.  All interaction with the outside world happens through
//! **port traits** defined in [`ports`], keeping this layer testable
//! without real peripherals or a network.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
