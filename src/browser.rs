//! Browser launching
//!
//! Opening a browser tab is a convenience: callers log failures and keep serving.

use crate::error::BrowserLaunchError;
use std::process::{Command, Stdio};

/// Something that can show a URL to the user
pub trait BrowserLauncher: Send + Sync + 'static {
    /// Open `url`. May block until the launcher process exits.
    fn open(&self, url: &str) -> Result<(), BrowserLaunchError>;
}

/// The platform's default browser, via its standard opener command
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> Result<(), BrowserLaunchError> {
        let (program, args) = opener_command(url).ok_or(BrowserLaunchError::Unsupported)?;

        let status = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| BrowserLaunchError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(BrowserLaunchError::Exit {
                program: program.to_string(),
                status,
            })
        }
    }
}

/// Program and arguments that open `url` on the current platform
pub fn opener_command(url: &str) -> Option<(&'static str, Vec<String>)> {
    if cfg!(target_os = "macos") {
        Some(("open", vec![url.to_string()]))
    } else if cfg!(target_os = "windows") {
        // The empty string is the window title `start` would otherwise take from the URL
        Some((
            "cmd",
            vec![
                "/C".to_string(),
                "start".to_string(),
                String::new(),
                url.to_string(),
            ],
        ))
    } else if cfg!(unix) {
        Some(("xdg-open", vec![url.to_string()]))
    } else {
        None
    }
}
