// Harbormaster Library - station config in, engine script out, engine commands over telnet
// Modular design makes it easy to swap out components

pub mod config;     // app settings + deployment context
pub mod control;    // telnet control channel to a running engine
pub mod error;      // one error enum for everything
pub mod liquidsoap; // script generation
pub mod station;    // station model, playlists, ports

// Export the stuff other modules actually use
pub use config::{AppConfig, ControlSettings, DeploymentContext, StationPaths};
pub use control::ControlChannel;
pub use error::{Error, Result};
pub use liquidsoap::{GeneratedScript, ScriptGenerator};
pub use station::{PlaylistRepository, StationConfig, StationFile, StationPorts};
