// Control channel - talks to a running engine over its telnet socket
// One connection per command: connect, write, read until the engine hangs up

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::config::{ControlSettings, DeploymentContext};
use crate::error::{Error, Result};
use crate::station::ports;

/// Skips the current track on the first output.
pub const SKIP_COMMAND: &str = "radio_out_1.skip";

#[derive(Debug, Clone)]
pub struct ControlChannel {
    host: String,
    port: u16,
    connect_timeout: Duration,
    /// Deadline for the whole read phase; `None` waits as long as the engine does.
    read_timeout: Option<Duration>,
}

impl ControlChannel {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let defaults = ControlSettings::default();
        Self {
            host: host.into(),
            port,
            connect_timeout: defaults.connect_timeout(),
            read_timeout: defaults.read_timeout(),
        }
    }

    /// Channel for a station's engine, on the port its script binds.
    pub fn for_station(
        context: &DeploymentContext,
        settings: &ControlSettings,
        station_id: u32,
    ) -> Result<Self> {
        let port = ports::telnet_port(station_id)?;
        Ok(Self::new(context.control_host.clone(), port)
            .with_connect_timeout(settings.connect_timeout())
            .with_read_timeout(settings.read_timeout()))
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send one command and collect every line the engine answers with.
    pub async fn send(&self, command: &str) -> Result<Vec<String>> {
        let address = (self.host.as_str(), self.port);
        let mut stream = match timeout(self.connect_timeout, TcpStream::connect(address)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(Error::connection(&e)),
            Err(_) => {
                return Err(Error::timed_out(&format!(
                    "connecting to {}:{}",
                    self.host, self.port
                )))
            }
        };

        let command = unescape_command(command);
        debug!("Sending to {}:{}: {}", self.host, self.port, command);

        let payload = format!("{}\nquit\n", command);
        stream
            .write_all(payload.as_bytes())
            .await
            .map_err(|e| Error::connection(&e))?;
        stream.flush().await.map_err(|e| Error::connection(&e))?;

        let response = match self.read_timeout {
            Some(limit) => timeout(limit, read_to_end(stream))
                .await
                .map_err(|_| Error::timed_out("reading response"))??,
            None => read_to_end(stream).await?,
        };

        debug!("Engine answered with {} lines", response.len());
        Ok(response)
    }

    pub async fn skip(&self) -> Result<Vec<String>> {
        self.send(SKIP_COMMAND).await
    }
}

/// One-shot helper: `send(host, port, command, timeout)` without building a channel.
/// The timeout bounds connecting and reading separately.
pub async fn send(host: &str, port: u16, command: &str, timeout_secs: u64) -> Result<Vec<String>> {
    let limit = Duration::from_secs(timeout_secs);
    ControlChannel::new(host, port)
        .with_connect_timeout(limit)
        .with_read_timeout(Some(limit))
        .send(command)
        .await
}

/// Lines until end-of-stream, trimmed. The engine closes the socket after `quit`.
async fn read_to_end(stream: TcpStream) -> Result<Vec<String>> {
    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|e| Error::connection(&e))?;
        if read == 0 {
            break;
        }
        lines.push(String::from_utf8_lossy(&buf).trim().to_string());
    }

    Ok(lines)
}

/// Undo the escaping commands pick up on their way in: URL-decoding (with `+`
/// as space), then `\'` and `&amp;`.
pub fn unescape_command(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&decoded)
        .replace("\\'", "'")
        .replace("&amp;", "&")
}
