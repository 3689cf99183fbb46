//! Interactions with the external ffmpeg and ffprobe tools.
//!
//! The transcoder is an opaque external process: this module only builds
//! argument lists and checks tool availability. Spawning and progress
//! scraping live in [`crate::progress`].

use crate::error::{CoreError, CoreResult};
use std::io;
use std::process::{Command, Stdio};

pub mod ffmpeg;
pub mod probe;

/// Checks that a required external command is available and executable by
/// probing `<tool> -version`.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("dependency '{cmd_name}' not found");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("failed to start dependency check for '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
