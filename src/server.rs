//! WebSocket listener: one thread and one [`Session`] per client.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;

use tracing::{info, info_span, warn};

use crate::coach::Services;
use crate::conn::{ConnError, Connection};
use crate::session::{Session, SessionSettings};

/// Accepts coaching clients and hands each to its own session thread.
///
/// Sessions share the collaborator handles in [`Services`] but nothing
/// else: shot type, handedness and repeat history are per client.
pub struct Server {
    listener: TcpListener,
    services: Services,
    settings: SessionSettings,
}

impl Server {
    pub fn bind(
        addr: impl ToSocketAddrs,
        services: Services,
        settings: SessionSettings,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener, services, settings })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept clients forever.
    ///
    /// Per-client failures are logged and never stop the listener; only an
    /// error from the listening socket itself is returned.
    pub fn serve(&self) -> io::Result<()> {
        info!(addr = %self.listener.local_addr()?, "listening");
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.spawn_session(stream),
                Err(e) if is_transient(&e) => warn!(error = %e, "accept failed"),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn spawn_session(&self, stream: TcpStream) {
        let services = self.services.clone();
        let settings = self.settings;
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_owned());

        let spawned = thread::Builder::new()
            .name(format!("session-{peer}"))
            .spawn(move || {
                let _span = info_span!("session", %peer).entered();
                run_client(stream, services, settings);
            });
        if let Err(e) = spawned {
            warn!(error = %e, "could not start session thread");
        }
    }
}

fn run_client(stream: TcpStream, services: Services, settings: SessionSettings) {
    let mut conn = match Connection::accept(stream) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "handshake failed");
            return;
        }
    };
    info!(shot = %settings.shot, handedness = %settings.handedness, "client connected");

    let mut session = Session::new(services, settings);
    match session.run(&mut conn) {
        Ok(stats) => info!(
            messages = stats.messages,
            sent = stats.sent,
            suppressed = stats.suppressed,
            skipped = stats.skipped,
            "client disconnected"
        ),
        Err(e @ ConnError::Io(_)) => warn!(error = %e, "connection lost"),
        Err(e) => warn!(error = %e, "session ended"),
    }
    conn.close();
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use tungstenite::Message;

    use super::*;
    use crate::analysis::fixtures::guard;
    use crate::landmark::{BodyPart, Landmark, LANDMARK_COUNT};

    fn start() -> SocketAddr {
        let server = Server::bind("127.0.0.1:0", Services::offline(), SessionSettings::default())
            .unwrap();
        let addr = server.local_addr().unwrap();
        thread::spawn(move || server.serve());
        addr
    }

    fn narrow_stance_msg() -> String {
        let frame = guard()
            .with(BodyPart::LeftAnkle, Landmark::at(0.45, 0.95))
            .with(BodyPart::RightAnkle, Landmark::at(0.55, 0.95));
        let lms: Vec<Landmark> = BodyPart::ALL
            .iter()
            .map(|&p| frame.landmark(p).copied().unwrap_or(Landmark::at(0.0, 0.0)))
            .collect();
        assert_eq!(lms.len(), LANDMARK_COUNT);
        serde_json::json!({ "type": "landmarks", "landmarks": lms }).to_string()
    }

    #[test]
    fn client_receives_audio_feedback() {
        let addr = start();
        let (mut ws, _) = tungstenite::connect(format!("ws://{addr}")).unwrap();
        ws.send(Message::Text("not a frame".into())).unwrap();
        ws.send(Message::Text(narrow_stance_msg())).unwrap();

        let reply = loop {
            match ws.read().unwrap() {
                Message::Text(text) => break text,
                _ => continue,
            }
        };
        let json: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(json["type"], "audio_feedback");
        assert!(json["message"].as_str().unwrap().contains("shoulder-width"));
        assert_eq!(json["audio"], "");

        ws.close(None).unwrap();
    }

    #[test]
    fn bad_handshake_does_not_stop_server() {
        use std::io::Write;

        let addr = start();
        let mut raw = TcpStream::connect(addr).unwrap();
        raw.write_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        drop(raw);

        let (mut ws, _) = tungstenite::connect(format!("ws://{addr}")).unwrap();
        ws.close(None).unwrap();
    }
}
