//! Telemetry link to the remote counterpart.
//!
//! ```text
//!  ┌─────────────────────────────────────────────────────┐
//!  │ channel  : state machine, handshake, inbound log    │
//!  ├─────────────────────────────────────────────────────┤
//!  │ envelope : JSON `{"type": .., ...}` codec           │
//!  ├─────────────────────────────────────────────────────┤
//!  │ transport: Transport trait, LinkEvent, Null impl    │
//!  ├─────────────────────────────────────────────────────┤
//!  │ io_task  : tungstenite WebSocket I/O thread         │
//!  └─────────────────────────────────────────────────────┘
//! ```

pub mod channel;
pub mod envelope;
pub mod io_task;
pub mod transport;
