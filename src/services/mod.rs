pub mod osc_receiver;
pub mod osc_sender;

pub use osc_receiver::{decode_datagram, ListenerStats, NetworkListener, DEFAULT_RECEIVE_TIMEOUT};
pub use osc_sender::OscSender;
