//! WebSocket connection to one coaching client.
//!
//! Handles the WebSocket handshake, text-frame I/O, and message
//! encode/decode. No application logic: [`Session`](crate::session::Session)
//! drives what happens with each message.

use std::fmt;
use std::io;
use std::net::{SocketAddr, TcpStream};

use tungstenite::protocol::WebSocket;
use tungstenite::Message as WsMessage;

use crate::protocol::Outbound;

/// Errors from connection operations.
#[derive(Debug)]
pub enum ConnError {
    /// TCP I/O error.
    Io(io::Error),
    /// WebSocket handshake failed.
    Handshake(String),
    /// WebSocket protocol or framing error.
    WebSocket(tungstenite::Error),
    /// Peer closed the connection.
    Disconnected,
}

impl fmt::Display for ConnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnError::Io(e) => write!(f, "I/O error: {e}"),
            ConnError::Handshake(msg) => write!(f, "websocket handshake failed: {msg}"),
            ConnError::WebSocket(e) => write!(f, "websocket error: {e}"),
            ConnError::Disconnected => write!(f, "connection closed by client"),
        }
    }
}

impl std::error::Error for ConnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnError::Io(e) => Some(e),
            ConnError::WebSocket(e) => Some(e),
            ConnError::Handshake(_) | ConnError::Disconnected => None,
        }
    }
}

impl From<io::Error> for ConnError {
    fn from(e: io::Error) -> Self {
        ConnError::Io(e)
    }
}

impl From<tungstenite::Error> for ConnError {
    fn from(e: tungstenite::Error) -> Self {
        match e {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                ConnError::Disconnected
            }
            tungstenite::Error::Io(io) => ConnError::Io(io),
            other => ConnError::WebSocket(other),
        }
    }
}

/// A bidirectional message channel to one client.
///
/// Implemented by [`Connection`] for real sockets; tests substitute an
/// in-memory queue.
pub trait Channel {
    /// Block until the next text message arrives.
    ///
    /// Returns `ConnError::Disconnected` once the client has gone away.
    fn recv(&mut self) -> Result<String, ConnError>;

    /// Send one outbound message.
    fn send(&mut self, msg: &Outbound) -> Result<(), ConnError>;
}

/// Server side of a WebSocket connection.
///
/// Synchronous, one per session thread.
pub struct Connection {
    socket: WebSocket<TcpStream>,
    peer: SocketAddr,
}

impl Connection {
    /// Complete the server-side WebSocket handshake on an accepted stream.
    pub fn accept(stream: TcpStream) -> Result<Self, ConnError> {
        let peer = stream.peer_addr()?;
        // Frames are small and latency-sensitive.
        let _ = stream.set_nodelay(true);
        let socket = tungstenite::accept(stream).map_err(|e| ConnError::Handshake(e.to_string()))?;
        Ok(Self { socket, peer })
    }

    /// The client's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Send a close frame. Errors are ignored; the peer may already be gone.
    pub fn close(&mut self) {
        let _ = self.socket.close(None);
        let _ = self.socket.flush();
    }
}

impl Channel for Connection {
    fn recv(&mut self) -> Result<String, ConnError> {
        loop {
            match self.socket.read()? {
                WsMessage::Text(text) => return Ok(text),
                WsMessage::Close(_) => return Err(ConnError::Disconnected),
                // Pings are answered inside tungstenite; binary frames carry
                // nothing we understand.
                WsMessage::Binary(_) | WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {
                    continue;
                }
            }
        }
    }

    fn send(&mut self, msg: &Outbound) -> Result<(), ConnError> {
        self.socket.send(WsMessage::Text(msg.to_json()))?;
        Ok(())
    }
}
