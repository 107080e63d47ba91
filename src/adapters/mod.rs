//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to                 |
//! |----------------|--------------|-----------------------------|
//! | `actuator`     | ActuatorPort | log output / relay GPIO     |
//! | `clock`        | Clock        | system UTC clock / manual   |
//! | `forward_sink` | EventSink    | std mpsc observer channel   |
//! | `log_sink`     | EventSink    | `log` facade                |
//!
//! The sensor model and telemetry transport adapters live with their
//! subsystems (`sensors::simulated`, `telemetry::io_task`).

pub mod actuator;
pub mod clock;
pub mod forward_sink;
pub mod log_sink;
