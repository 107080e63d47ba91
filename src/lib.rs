//! Irrigation controller core.
//!
//! Simulated soil sensors, hysteresis pump control, a rolling 24-sample
//! history and a WebSocket telemetry channel, wired together by a single
//! event loop.  Exposes every module for integration testing and for
//! embedding behind another control surface.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod history;
pub mod runtime;
pub mod sensors;
pub mod status;
pub mod telemetry;
pub mod timer;
