//! Opening the authorization URL in the user's browser.
//!
//! The launch command is chosen once, when the launcher is built, from the
//! target operating system. Launching is fire and forget: the child process
//! is spawned and not waited on.

use std::{io, process::Command};

use crate::error::BrowserError;

/// Anything that can show a URL to the user.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> Result<(), BrowserError>;
}

/// Spawns an external program without waiting for it.
pub trait CommandRunner: Send + Sync {
    fn spawn(&self, program: &str, args: &[&str]) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn spawn(&self, program: &str, args: &[&str]) -> io::Result<()> {
        Command::new(program).args(args).spawn().map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    MacOs,
    Windows,
    XdgOpen,
}

impl Opener {
    fn for_os(os: &str) -> Option<Self> {
        match os {
            "macos" => Some(Opener::MacOs),
            "windows" => Some(Opener::Windows),
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Some(Opener::XdgOpen),
            _ => None,
        }
    }
}

/// Default browser of the host system.
pub struct SystemBrowser<R = ProcessRunner> {
    opener: Result<Opener, String>,
    runner: R,
}

impl SystemBrowser<ProcessRunner> {
    pub fn new() -> Self {
        Self::for_os(std::env::consts::OS, ProcessRunner)
    }
}

impl Default for SystemBrowser<ProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> SystemBrowser<R> {
    pub fn for_os(os: &str, runner: R) -> Self {
        Self {
            opener: Opener::for_os(os).ok_or_else(|| os.to_string()),
            runner,
        }
    }
}

impl<R: CommandRunner> BrowserLauncher for SystemBrowser<R> {
    fn open(&self, url: &str) -> Result<(), BrowserError> {
        let opener = self
            .opener
            .as_ref()
            .map_err(|os| BrowserError::UnsupportedPlatform(os.clone()))?;

        tracing::debug!(?opener, "opening authorization url");

        match opener {
            Opener::MacOs => self.runner.spawn("open", &[url])?,
            Opener::XdgOpen => self.runner.spawn("xdg-open", &[url])?,
            // cmd treats `&` as a command separator and the first quoted
            // argument of `start` as a window title.
            Opener::Windows => {
                let escaped = url.replace('&', "^&");
                self.runner.spawn("cmd", &["/C", "start", "", escaped.as_str()])?
            }
        }

        Ok(())
    }
}
