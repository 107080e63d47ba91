//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Everything runs on the host with no network
//! and no real hardware.

mod mock_hw;
mod session_tests;
mod telemetry_tests;
