//! Command-line argument parsing for the agent
//!
//! The binary is plumbing around the engine: the flags only choose which
//! files to load and which backend to force.

use clap::Parser;
use std::path::PathBuf;

use crate::inject::BackendKind;

/// Gesture-triggered key macros
#[derive(Parser, Debug)]
#[command(name = "keyecho", version, about = "Gesture-triggered key macros")]
pub struct CliArgs {
    /// Macro profile file (JSON). Defaults to ~/.config/keyecho/profile.json
    #[arg(short = 'p', long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Gesture settings file (YAML). Defaults to ~/.config/keyecho/settings.yaml
    #[arg(short = 's', long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Force a specific injection backend (interception, sendinput, null)
    #[arg(short = 'b', long, value_name = "BACKEND")]
    pub backend: Option<String>,

    /// Print the known key names and exit
    #[arg(long)]
    pub list_keys: bool,
}

impl CliArgs {
    /// Parse the --backend override, rejecting unknown names early.
    pub fn forced_backend(&self) -> Result<Option<BackendKind>, String> {
        match &self.backend {
            Some(name) => name.parse().map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(backend: Option<&str>) -> CliArgs {
        CliArgs {
            profile: None,
            settings: None,
            backend: backend.map(str::to_string),
            list_keys: false,
        }
    }

    #[test]
    fn test_no_backend_flag() {
        assert_eq!(args(None).forced_backend(), Ok(None));
    }

    #[test]
    fn test_backend_flag_parses() {
        assert_eq!(
            args(Some("null")).forced_backend(),
            Ok(Some(BackendKind::Null))
        );
        assert_eq!(
            args(Some("driver")).forced_backend(),
            Ok(Some(BackendKind::Interception))
        );
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(args(Some("telepathy")).forced_backend().is_err());
    }
}
