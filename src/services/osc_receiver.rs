// src/services/osc_receiver.rs
// NetworkListener owns the inbound UDP socket and gets its own thread.
// Datagrams are handled one at a time: decode, route, push onto the queue.
// The thread never touches host state.

use nannou_osc as osc;
use std::{
    io::ErrorKind,
    net::{SocketAddr, UdpSocket},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::controllers::{CoalescingQueue, Dispatcher};
use crate::error::{BindError, DecodeError};

pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(100);

/// Largest UDP payload.
const MAX_DATAGRAM_SIZE: usize = 65536;

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    malformed: AtomicU64,
    queued: AtomicU64,
}

/// Snapshot of the listener counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub received: u64,
    pub malformed: u64,
    pub queued: u64,
}

pub struct NetworkListener {
    thread_handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    counters: Arc<Counters>,
    local_addr: SocketAddr,
}

/// Decode one datagram, flattening bundles into their messages.
pub fn decode_datagram(bytes: &[u8]) -> Result<Vec<osc::Message>, DecodeError> {
    osc::decode(bytes)
        .map(|packet| packet.into_msgs())
        .map_err(|e| DecodeError {
            len: bytes.len(),
            reason: format!("{:?}", e),
        })
}

impl NetworkListener {
    /// Bind the socket and spawn the receive loop. Bind failures are returned
    /// here, before any thread exists.
    pub fn start(
        bind_address: &str,
        port: u16,
        dispatcher: Arc<Dispatcher>,
        queue: Arc<CoalescingQueue>,
        receive_timeout: Duration,
    ) -> Result<Self, BindError> {
        let bind_error = |source: std::io::Error| BindError {
            address: bind_address.to_string(),
            port,
            source,
        };

        let socket = UdpSocket::bind((bind_address, port)).map_err(bind_error)?;
        // a zero timeout would mean "block forever"
        let timeout = receive_timeout.max(Duration::from_millis(1));
        socket.set_read_timeout(Some(timeout)).map_err(bind_error)?;
        let local_addr = socket.local_addr().map_err(bind_error)?;

        let running = Arc::new(AtomicBool::new(true));
        let counters = Arc::new(Counters::default());

        let running_clone = running.clone();
        let counters_clone = counters.clone();
        let thread_handle = thread::Builder::new()
            .name("osc-listener".to_string())
            .spawn(move || {
                Self::receive_loop(socket, dispatcher, queue, running_clone, counters_clone);
            })
            .map_err(bind_error)?;

        log::info!("OSC listener bound to {}", local_addr);

        Ok(Self {
            thread_handle: Some(thread_handle),
            running,
            counters,
            local_addr,
        })
    }

    fn receive_loop(
        socket: UdpSocket,
        dispatcher: Arc<Dispatcher>,
        queue: Arc<CoalescingQueue>,
        running: Arc<AtomicBool>,
        counters: Arc<Counters>,
    ) {
        let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

        while running.load(Ordering::Acquire) {
            // recv_from returns after at most one read timeout so stop is noticed
            let (len, src) = match socket.recv_from(&mut buffer) {
                Ok(result) => result,
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => {
                    log::error!("OSC receive error: {}", e);
                    continue;
                }
            };
            counters.received.fetch_add(1, Ordering::Relaxed);

            let messages = match decode_datagram(&buffer[..len]) {
                Ok(messages) => messages,
                Err(e) => {
                    counters.malformed.fetch_add(1, Ordering::Relaxed);
                    log::debug!("dropping datagram from {}: {}", src, e);
                    continue;
                }
            };

            for message in messages {
                log::trace!("{} {:?}", message.addr, message.args);
                queue.push(dispatcher.route(&message.addr, message.args));
                counters.queued.fetch_add(1, Ordering::Relaxed);
            }
        }

        // socket is dropped here, releasing the port
        log::info!("OSC listener stopped");
    }

    /// Signal the loop and wait for it to exit. Safe to call more than once.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("OSC listener thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> ListenerStats {
        ListenerStats {
            received: self.counters.received.load(Ordering::Relaxed),
            malformed: self.counters.malformed.load(Ordering::Relaxed),
            queued: self.counters.queued.load(Ordering::Relaxed),
        }
    }
}

impl Drop for NetworkListener {
    fn drop(&mut self) {
        self.stop();
    }
}
