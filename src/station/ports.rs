// Per-station port allocation
// Every station gets a block of 10 ports starting at 8000; external tooling
// depends on this exact layout, so don't touch the formula.

use crate::error::{Error, Result};

pub const BASE_PORT: u32 = 8000;
const PORTS_PER_STATION: u32 = 10;
const TELNET_OFFSET: u32 = 4;
const STREAM_OFFSET: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationPorts {
    /// Engine control socket.
    pub telnet: u16,
    /// Harbor input for live DJs.
    pub stream: u16,
}

impl StationPorts {
    pub fn for_station(station_id: u32) -> Result<Self> {
        Ok(Self {
            telnet: telnet_port(station_id)?,
            stream: stream_port(station_id)?,
        })
    }
}

pub fn telnet_port(station_id: u32) -> Result<u16> {
    derive_port(station_id, TELNET_OFFSET)
}

pub fn stream_port(station_id: u32) -> Result<u16> {
    derive_port(station_id, STREAM_OFFSET)
}

fn derive_port(station_id: u32, offset: u32) -> Result<u16> {
    if station_id == 0 {
        return Err(Error::Configuration("station ids start at 1".to_string()));
    }

    (station_id - 1)
        .checked_mul(PORTS_PER_STATION)
        .and_then(|block| block.checked_add(BASE_PORT + offset))
        .and_then(|port| u16::try_from(port).ok())
        .ok_or_else(|| {
            Error::Configuration(format!(
                "station {} has no room in the port range",
                station_id
            ))
        })
}
