//! WebSocket I/O thread: bridges the blocking socket to the event loop.
//!
//! ```text
//!  ┌────────────────────┐  LinkEvent (EventQueue)  ┌──────────────┐
//!  │  link-io thread    │─────────────────────────▶│  Event Loop  │
//!  │  tungstenite       │◀─────────────────────────│  (session)   │
//!  └────────────────────┘  Outbound (channel)      └──────────────┘
//! ```
//!
//! One connection attempt is made.  After the handshake the thread
//! alternates between draining the outbound channel and a short
//! read-with-timeout, so outbound frames wait at most one read timeout.
//! The thread ends on remote close, any error, or a local close request.
//! A close request also raises a shared flag, so it lands even when the
//! outbound channel is full.

use std::io;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::transport::{LinkEvent, Transport};
use crate::error::LinkError;
use crate::events::{Event, EventQueue};

/// Outbound channel depth.
const OUTBOUND_DEPTH: usize = 16;

/// Socket read timeout between outbound drains.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Request from the event loop to the I/O thread.
#[derive(Debug)]
pub enum Outbound {
    Text(String),
    Close,
}

type OutboundChannel = Arc<Channel<CriticalSectionRawMutex, Outbound, OUTBOUND_DEPTH>>;
type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// [`Transport`] backed by the I/O thread's outbound channel.
pub struct LinkTransport {
    outbound: OutboundChannel,
    close_requested: Arc<AtomicBool>,
    closed: bool,
}

impl Transport for LinkTransport {
    fn send_text(&mut self, frame: String) -> Result<(), LinkError> {
        if self.closed {
            return Err(LinkError::Closed);
        }
        self.outbound
            .try_send(Outbound::Text(frame))
            .map_err(|_| LinkError::QueueFull)
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.close_requested.store(true, Ordering::Release);
        if self.outbound.try_send(Outbound::Close).is_err() {
            debug!("Telemetry: outbound queue full, close signalled by flag");
        }
    }
}

/// Spawn the I/O thread for `endpoint`.  Link events are pushed into
/// `events`; the returned transport feeds the thread's outbound side.
pub fn spawn(endpoint: String, events: EventQueue) -> io::Result<(LinkTransport, JoinHandle<()>)> {
    let outbound: OutboundChannel = Arc::new(Channel::new());
    let close_requested = Arc::new(AtomicBool::new(false));
    let rx = outbound.clone();
    let stop = close_requested.clone();
    let handle = thread::Builder::new()
        .name("link-io".into())
        .spawn(move || run(&endpoint, &events, &rx, &stop))?;
    Ok((
        LinkTransport {
            outbound,
            close_requested,
            closed: false,
        },
        handle,
    ))
}

fn run(
    endpoint: &str,
    events: &EventQueue,
    outbound: &OutboundChannel,
    close_requested: &AtomicBool,
) {
    info!("Telemetry: connecting to {}", endpoint);
    let mut socket = match tungstenite::connect(endpoint) {
        Ok((socket, response)) => {
            debug!("Telemetry: handshake status {}", response.status());
            socket
        }
        Err(e) => {
            events.push(Event::Link(LinkEvent::Failed(
                LinkError::Connect(e.to_string()).to_string(),
            )));
            return;
        }
    };

    if let Err(e) = set_read_timeout(&socket, READ_TIMEOUT) {
        warn!("Telemetry: cannot set read timeout: {}", e);
    }
    events.push(Event::Link(LinkEvent::Opened));

    loop {
        while let Ok(msg) = outbound.try_receive() {
            match msg {
                Outbound::Text(frame) => {
                    if let Err(e) = socket.send(Message::Text(frame)) {
                        events.push(Event::Link(LinkEvent::Failed(
                            LinkError::Io(e.to_string()).to_string(),
                        )));
                        return;
                    }
                }
                Outbound::Close => {
                    close_socket(&mut socket);
                    return;
                }
            }
        }
        if close_requested.load(Ordering::Acquire) {
            close_socket(&mut socket);
            return;
        }

        match socket.read() {
            Ok(Message::Text(text)) => events.push(Event::Link(LinkEvent::Text(text))),
            Ok(Message::Binary(bytes)) => events.push(Event::Link(LinkEvent::Binary(bytes))),
            Ok(Message::Close(_)) => {
                events.push(Event::Link(LinkEvent::Closed));
                return;
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                events.push(Event::Link(LinkEvent::Closed));
                return;
            }
            Err(e) => {
                events.push(Event::Link(LinkEvent::Failed(
                    LinkError::Io(e.to_string()).to_string(),
                )));
                return;
            }
        }
    }
}

fn close_socket(socket: &mut Socket) {
    let _ = socket.close(None);
    let _ = socket.flush();
    debug!("Telemetry: I/O thread closed locally");
}

fn set_read_timeout(socket: &Socket, timeout: Duration) -> io::Result<()> {
    match socket.get_ref() {
        MaybeTlsStream::Plain(s) => s.set_read_timeout(Some(timeout)),
        MaybeTlsStream::Rustls(s) => s.get_ref().set_read_timeout(Some(timeout)),
        _ => Ok(()),
    }
}
