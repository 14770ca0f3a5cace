// SPDX-FileCopyrightText: 2026 Banter Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! WebSocket Transport
//!
//! Real transport implementation using tungstenite for WebSocket
//! connections. Supports both native-tls and rustls TLS backends.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

#[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
use native_tls::TlsConnector;

#[cfg(feature = "network-rustls")]
use rustls::pki_types::ServerName;
#[cfg(feature = "network-rustls")]
use std::sync::Arc;

use tungstenite::client::IntoClientRequest;
use tungstenite::handshake::HandshakeError;
use tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tungstenite::protocol::CloseFrame;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::error::RealtimeError;
use super::frame::{CloseCode, OutboundFrame};
use super::transport::{SocketState, Transport, TransportConfig, TransportResult};

/// WebSocket transport for the chat backend.
///
/// Supports both ws:// (plaintext) and wss:// (TLS) endpoints. Frames are
/// JSON text messages; WebSocket-level ping is answered here, while
/// protocol-level heartbeat frames pass through to the manager.
pub struct WebSocketTransport {
    socket: Option<WebSocket<MaybeTlsStream<TcpStream>>>,
    state: SocketState,
}

impl WebSocketTransport {
    /// Creates a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport {
            socket: None,
            state: SocketState::Disconnected,
        }
    }

    /// Parses a WebSocket URL into host and port.
    fn parse_url(url: &str) -> Result<(String, u16, bool), RealtimeError> {
        let is_tls = url.starts_with("wss://");
        let url_without_scheme = url
            .strip_prefix("wss://")
            .or_else(|| url.strip_prefix("ws://"))
            .ok_or_else(|| {
                RealtimeError::ConnectionFailed(
                    "Invalid URL scheme (expected ws:// or wss://)".into(),
                )
            })?;

        // Split host:port/path
        let host_port = url_without_scheme
            .split('/')
            .next()
            .unwrap_or(url_without_scheme);

        let (host, port) = if let Some(colon_pos) = host_port.rfind(':') {
            let host = &host_port[..colon_pos];
            let port_str = &host_port[colon_pos + 1..];
            let port: u16 = port_str.parse().map_err(|_| {
                RealtimeError::ConnectionFailed(format!("Invalid port: {}", port_str))
            })?;
            (host.to_string(), port)
        } else {
            let default_port = if is_tls { 443 } else { 80 };
            (host_port.to_string(), default_port)
        };

        Ok((host, port, is_tls))
    }

    /// TCP connect bounded by the configured connect timeout.
    fn connect_tcp(addr: &str, timeout: Duration) -> Result<TcpStream, RealtimeError> {
        let mut addrs = addr
            .to_socket_addrs()
            .map_err(|e| RealtimeError::ConnectionFailed(format!("DNS lookup failed: {}", e)))?;
        let socket_addr = addrs
            .next()
            .ok_or_else(|| RealtimeError::ConnectionFailed(format!("No address for {}", addr)))?;
        TcpStream::connect_timeout(&socket_addr, timeout)
            .map_err(|e| RealtimeError::ConnectionFailed(e.to_string()))
    }

    /// Create a TLS stream using native-tls
    #[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
    fn create_tls_stream(
        host: &str,
        tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, RealtimeError> {
        let connector = TlsConnector::new()
            .map_err(|e| RealtimeError::ConnectionFailed(format!("TLS error: {}", e)))?;
        let tls_stream = connector.connect(host, tcp_stream).map_err(|e| {
            RealtimeError::ConnectionFailed(format!("TLS handshake failed: {}", e))
        })?;
        Ok(MaybeTlsStream::NativeTls(tls_stream))
    }

    /// Create a TLS stream using rustls
    #[cfg(feature = "network-rustls")]
    fn create_tls_stream(
        host: &str,
        tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, RealtimeError> {
        // Create root certificate store from webpki roots
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let server_name: ServerName<'_> = host.try_into().map_err(|_| {
            RealtimeError::ConnectionFailed(format!("Invalid server name: {}", host))
        })?;

        let tls_conn = rustls::ClientConnection::new(Arc::new(config), server_name.to_owned())
            .map_err(|e| RealtimeError::ConnectionFailed(format!("TLS setup failed: {}", e)))?;

        let tls_stream = rustls::StreamOwned::new(tls_conn, tcp_stream);
        Ok(MaybeTlsStream::Rustls(tls_stream))
    }

    /// Adjusts the read timeout on the TCP stream under the (possibly
    /// TLS-wrapped) socket.
    fn set_read_timeout(
        stream: &MaybeTlsStream<TcpStream>,
        timeout: Duration,
    ) -> Result<(), RealtimeError> {
        let tcp = match stream {
            MaybeTlsStream::Plain(s) => s,
            #[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
            MaybeTlsStream::NativeTls(s) => s.get_ref(),
            #[cfg(feature = "network-rustls")]
            MaybeTlsStream::Rustls(s) => s.get_ref(),
            _ => return Ok(()),
        };
        tcp.set_read_timeout(Some(timeout))
            .map_err(|e| RealtimeError::ConnectionFailed(e.to_string()))
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()> {
        if matches!(self.state, SocketState::Connected) {
            return Ok(());
        }

        self.state = SocketState::Connecting;

        let connect_timeout = Duration::from_millis(config.connect_timeout_ms);
        let deadline = Instant::now() + connect_timeout;

        let (host, port, is_tls) = Self::parse_url(&config.endpoint_url).inspect_err(|_| {
            self.state = SocketState::Disconnected;
        })?;
        let addr = format!("{}:{}", host, port);

        let tcp_stream = Self::connect_tcp(&addr, connect_timeout).inspect_err(|_| {
            self.state = SocketState::Disconnected;
        })?;

        // The full connect timeout applies through the handshake; the read
        // timeout is narrowed to the poll window only once the channel is up.
        tcp_stream
            .set_read_timeout(Some(connect_timeout))
            .map_err(|e| RealtimeError::ConnectionFailed(e.to_string()))?;
        tcp_stream
            .set_write_timeout(Some(connect_timeout))
            .map_err(|e| RealtimeError::ConnectionFailed(e.to_string()))?;

        // Wrap in TLS if needed
        let stream: MaybeTlsStream<TcpStream> = if is_tls {
            Self::create_tls_stream(&host, tcp_stream).inspect_err(|_| {
                self.state = SocketState::Disconnected;
            })?
        } else {
            MaybeTlsStream::Plain(tcp_stream)
        };

        // WebSocket handshake - use IntoClientRequest for proper HTTP/1.1 request
        let request = config
            .endpoint_url
            .as_str()
            .into_client_request()
            .map_err(|e| {
                self.state = SocketState::Disconnected;
                RealtimeError::ConnectionFailed(format!("Invalid WebSocket request: {}", e))
            })?;

        // A read timing out mid-handshake surfaces as an interrupted
        // handshake; keep retrying until the connect deadline.
        let mut handshake = tungstenite::client(request, stream);
        let socket = loop {
            match handshake {
                Ok((socket, _response)) => break socket,
                Err(HandshakeError::Interrupted(mid)) => {
                    if Instant::now() >= deadline {
                        self.state = SocketState::Disconnected;
                        return Err(RealtimeError::ConnectTimeout(config.connect_timeout_ms));
                    }
                    handshake = mid.handshake();
                }
                Err(HandshakeError::Failure(e)) => {
                    self.state = SocketState::Disconnected;
                    return Err(RealtimeError::ConnectionFailed(format!(
                        "WebSocket handshake failed: {}",
                        e
                    )));
                }
            }
        };

        Self::set_read_timeout(
            socket.get_ref(),
            Duration::from_millis(config.receive_poll_ms),
        )
        .inspect_err(|_| {
            self.state = SocketState::Disconnected;
        })?;

        self.socket = Some(socket);
        self.state = SocketState::Connected;

        Ok(())
    }

    fn close(&mut self, code: CloseCode) -> TransportResult<()> {
        if let Some(mut socket) = self.socket.take() {
            let frame = CloseFrame {
                code: WsCloseCode::from(code.as_u16()),
                reason: "".into(),
            };
            let _ = socket.close(Some(frame)); // Ignore errors on close
        }
        self.state = SocketState::Disconnected;
        Ok(())
    }

    fn state(&self) -> SocketState {
        self.state
    }

    fn send(&mut self, frame: &OutboundFrame) -> TransportResult<()> {
        let socket = self.socket.as_mut().ok_or(RealtimeError::NotConnected)?;

        let encoded = serde_json::to_string(frame)
            .map_err(|e| RealtimeError::SendFailed(format!("Serialization failed: {}", e)))?;

        socket.send(Message::Text(encoded)).map_err(|e| {
            // Connection may be broken
            if matches!(
                e,
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed
            ) {
                self.state = SocketState::Disconnected;
                RealtimeError::ConnectionClosed(CloseCode::Abnormal)
            } else {
                RealtimeError::SendFailed(e.to_string())
            }
        })?;

        // Flush to ensure the frame is on the wire
        socket
            .flush()
            .map_err(|e| RealtimeError::SendFailed(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn receive(&mut self) -> TransportResult<Option<String>> {
        let socket = self.socket.as_mut().ok_or(RealtimeError::NotConnected)?;

        match socket.read() {
            Ok(Message::Text(text)) => Ok(Some(text)),
            Ok(Message::Binary(_)) => {
                // The chat protocol is JSON text; binary data is dropped.
                tracing::warn!("dropping unexpected binary frame");
                Ok(None)
            }
            Ok(Message::Ping(data)) => {
                // Transport-level keepalive, answered below the frame layer
                let _ = socket.send(Message::Pong(data));
                Ok(None)
            }
            Ok(Message::Pong(_)) => Ok(None),
            Ok(Message::Close(frame)) => {
                self.state = SocketState::Disconnected;
                let code = frame
                    .map(|f| CloseCode::from_u16(f.code.into()))
                    .unwrap_or(CloseCode::Abnormal);
                Err(RealtimeError::ConnectionClosed(code))
            }
            Ok(Message::Frame(_)) => {
                // Raw frames shouldn't reach here
                Ok(None)
            }
            Err(tungstenite::Error::Io(ref e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                // No message available within the poll window
                Ok(None)
            }
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                self.state = SocketState::Disconnected;
                Err(RealtimeError::ConnectionClosed(CloseCode::Abnormal))
            }
            Err(e) => Err(RealtimeError::ReceiveFailed(e.to_string())),
        }
    }

    fn has_pending(&self) -> bool {
        // WebSocket doesn't provide a non-blocking check easily
        // Return false; caller should use receive() with timeout
        false
    }
}
