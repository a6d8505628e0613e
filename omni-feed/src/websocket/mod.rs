mod client;
mod messages;
mod reconnect;

pub use client::{SocketChannel, SocketHandle};
pub use messages::{parse_frame, SocketStatus};
pub use reconnect::{ReconnectPolicy, NORMAL_CLOSE};
