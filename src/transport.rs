//! Request/response exchange with a bulb over UDP.

use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use futures::future;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{self, Decoder};
use crate::errors::Error;
use crate::runtime::{self, AsyncUdpSocket, UdpSocket};

type Result<T> = std::result::Result<T, Error>;

/// Sends one protocol command and returns the bulb's decoded reply.
///
/// Implementations must only return `Ok` for replies whose status marks
/// success; [`UdpTransport`] is the implementation used against real bulbs.
pub trait Transport: Send + Sync {
    fn request(&self, command: &Value) -> impl Future<Output = Result<Value>> + Send;
}

/// Tunables for [`UdpTransport`].
///
/// # Examples
///
/// ```
/// use tplight_rs::TransportConfig;
///
/// let config: TransportConfig = serde_json::from_str(r#"{"max_retries": 2}"#).unwrap();
/// assert_eq!(config.max_retries, 2);
/// assert_eq!(config.port, 9999);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// UDP port the bulb listens on.
    pub port: u16,
    /// Receive deadline of the first attempt; attempt `n` waits `n` times as long.
    pub base_timeout_ms: u64,
    /// Attempts made before giving up with [`Error::Timeout`].
    pub max_retries: u32,
    /// Size of the datagram receive buffer.
    pub buffer_size: usize,
}

impl TransportConfig {
    pub const DEFAULT_PORT: u16 = 9999;
    pub const DEFAULT_TIMEOUT_MS: u64 = 500;
    pub const DEFAULT_MAX_RETRIES: u32 = 5;

    /// Receive deadline for the given 1-based attempt.
    pub fn attempt_timeout(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_timeout_ms.saturating_mul(u64::from(attempt)))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            port: Self::DEFAULT_PORT,
            base_timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            buffer_size: 4096,
        }
    }
}

/// Talks to one bulb, opening a fresh socket for every attempt.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    ip: Ipv4Addr,
    config: TransportConfig,
}

impl UdpTransport {
    pub fn new(ip: Ipv4Addr, config: TransportConfig) -> Self {
        UdpTransport { ip, config }
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// One attempt: send the datagram and collect replies until the decoded
    /// stream holds a complete JSON document.
    async fn exchange(&self, wire: &[u8]) -> Result<String> {
        let peer = SocketAddrV4::new(self.ip, self.config.port);
        let socket = UdpSocket::connect_to(peer)
            .await
            .map_err(|e| Error::socket("connect", e))?;

        socket
            .send(wire)
            .await
            .map_err(|e| Error::socket("send", e))?;

        let mut buffer = vec![0u8; self.config.buffer_size];
        let mut decoder = Decoder::new();
        let mut plaintext = Vec::new();

        loop {
            let bytes = match socket.recv(&mut buffer).await {
                Ok(bytes) => bytes,
                // ICMP port unreachable: a rebooting bulb is not listening yet.
                // Nothing will arrive on this socket, so wait for the deadline.
                Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                    debug!("{} refused the request, waiting for retry", self.ip);
                    future::pending::<()>().await;
                    continue;
                }
                Err(e) => return Err(Error::socket("receive", e)),
            };
            plaintext.extend(decoder.feed(&buffer[..bytes]));
            if document_complete(&plaintext) {
                break;
            }
        }

        String::from_utf8(plaintext).map_err(Error::Utf8Decode)
    }
}

impl Transport for UdpTransport {
    async fn request(&self, command: &Value) -> Result<Value> {
        let plaintext = serde_json::to_vec(command).map_err(Error::JsonDump)?;
        let wire = codec::encode(&plaintext);
        let attempts = self.config.max_retries;

        debug!("{} <- {}", self.ip, command);

        for attempt in 1..=attempts {
            let deadline = self.config.attempt_timeout(attempt);
            match runtime::timeout(deadline, self.exchange(&wire)).await {
                Ok(raw) => return check_status(&raw?),
                Err(_) => debug!(
                    "{} timed out after {:?}, try {}/{}",
                    self.ip, deadline, attempt, attempts
                ),
            }
        }

        Err(Error::Timeout { attempts })
    }
}

/// Parse a decoded reply and fail unless it carries a zero `err_code`.
pub(crate) fn check_status(raw: &str) -> Result<Value> {
    let response: Value = serde_json::from_str(raw).map_err(Error::JsonLoad)?;
    match status_code(&response) {
        Some(0) => {
            debug!("-> {}", raw);
            Ok(response)
        }
        code => {
            warn!("bulb rejected request ({:?}): {}", code, raw);
            Err(Error::Protocol {
                code,
                response: raw.to_string(),
            })
        }
    }
}

/// The status lives either on the service object (unsupported service) or on
/// the method object (everything else).
fn status_code(response: &Value) -> Option<i64> {
    response.as_object()?.values().find_map(|service| {
        service.get("err_code").and_then(Value::as_i64).or_else(|| {
            service
                .as_object()?
                .values()
                .find_map(|method| method.get("err_code").and_then(Value::as_i64))
        })
    })
}

/// True once the bytes hold a JSON object whose outermost brace has closed.
fn document_complete(bytes: &[u8]) -> bool {
    let mut depth = 0usize;
    let mut opened = false;
    let mut in_string = false;
    let mut escaped = false;

    for &byte in bytes {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => {
                depth += 1;
                opened = true;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                if opened && depth == 0 {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}
