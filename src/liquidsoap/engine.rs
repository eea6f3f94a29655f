// Locating the engine binary and building its command line

use std::path::{Path, PathBuf};

use crate::config::{DeploymentContext, StationPaths};

const LEGACY_BINARY: &str = "/usr/bin/liquidsoap";
const FALLBACK_COMMAND: &str = "/bin/false";

/// opam install under the service user's home
fn opam_binary() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".opam").join("system").join("bin").join("liquidsoap"))
}

/// Explicit override, then opam (always in docker), then the distro package.
pub fn engine_binary(context: &DeploymentContext) -> Option<PathBuf> {
    if let Some(binary) = &context.engine_binary {
        return Some(binary.clone());
    }

    let opam = opam_binary();
    if let Some(opam) = opam {
        if context.inside_docker || opam.exists() {
            return Some(opam);
        }
    }

    let legacy = Path::new(LEGACY_BINARY);
    legacy.exists().then(|| legacy.to_path_buf())
}

/// What the process supervisor should run for this station.
pub fn engine_command(context: &DeploymentContext, paths: &StationPaths) -> String {
    match engine_binary(context) {
        Some(binary) => format!("{} {}", binary.display(), paths.script_path().display()),
        None => FALLBACK_COMMAND.to_string(),
    }
}
