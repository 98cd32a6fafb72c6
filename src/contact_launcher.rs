//! Hand phone numbers and email addresses to the platform's dialer and
//! mail client via `tel:` and `mailto:` URIs.

use anyhow::{Context, Result};
use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

pub fn tel_uri(phone: &str) -> String {
    format!("tel:{}", phone.trim())
}

pub fn mailto_uri(email: &str) -> String {
    format!("mailto:{}", email.trim())
}

/// Opens a URI with whatever handler the platform has registered.
///
/// Launching is fire-and-forget: callers only learn whether the handoff
/// could be started, never what the handler did with it.
pub trait ContactLauncher {
    fn open(&self, uri: &str) -> Result<()>;
}

/// Launcher backed by the OS opener command
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn command(uri: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            // Empty title argument so `start` does not treat the URI as one
            cmd.args(["/C", "start", "", uri]);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(uri);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(uri);
            cmd
        }
    }
}

impl ContactLauncher for SystemLauncher {
    fn open(&self, uri: &str) -> Result<()> {
        spawn_detached(Self::command(uri))
            .with_context(|| format!("Could not launch handler for {}", uri))?;
        tracing::debug!(target: "contact", "Handed off {}", uri);
        Ok(())
    }
}

/// Start `cmd` with null stdio and reap it on a background thread so the
/// opener never lingers as a zombie
fn spawn_detached(mut cmd: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    thread::Builder::new()
        .name("contact-opener".to_string())
        .spawn(move || {
            let status = child.wait();
            if let Ok(status) = &status {
                if !status.success() {
                    tracing::debug!(target: "contact", "Opener exited with {}", status);
                }
            }
            status
        })
}

/// Open a URI and swallow any failure after logging it
pub fn launch_best_effort(launcher: &dyn ContactLauncher, uri: &str) {
    if let Err(e) = launcher.open(uri) {
        tracing::warn!(target: "contact", "Handoff failed: {:#}", e);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records every URI instead of launching anything
    #[derive(Default)]
    pub struct RecordingLauncher {
        pub opened: RefCell<Vec<String>>,
        pub fail: bool,
    }

    impl ContactLauncher for RecordingLauncher {
        fn open(&self, uri: &str) -> Result<()> {
            self.opened.borrow_mut().push(uri.to_string());
            if self.fail {
                anyhow::bail!("no handler for {}", uri);
            }
            Ok(())
        }
    }
}
