//! Shell configuration.
//!
//! Configuration is a plain value. Build it in code with the `with_*`
//! setters, or parse it from a small JSON document kept next to the firmware
//! image:
//!
//! ```rust
//! use paramshell::system::config::ShellConfig;
//!
//! let config = ShellConfig::from_json(r#"{"host_name":"pump-7","watch_interval_ms":250}"#).unwrap();
//! assert_eq!(config.host_name.as_str(), "pump-7");
//! assert_eq!(config.watch_interval_ms, 250);
//! assert!(config.local_echo);
//! ```

use heapless::String;
use serde::{Deserialize, Serialize};

use super::error::Error;

/// Longest accepted host name.
pub const MAX_HOST_NAME_LEN: usize = 24;

/// Longest accepted build stamp.
pub const MAX_BUILD_DATE_LEN: usize = 16;

/// Host name used when none is configured.
pub const DEFAULT_HOST_NAME: &str = "device";

/// Interval between two prints in watch mode.
pub const DEFAULT_WATCH_INTERVAL_MS: u32 = 500;

/// Date shown by `ll`.
pub const DEFAULT_BUILD_DATE: &str = "Jan  1 2025";

/// Runtime settings of a [`Shell`](super::shell::Shell).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shown in the prompt as `root@<host_name>:`.
    pub host_name: String<MAX_HOST_NAME_LEN>,
    /// Echo typed characters back. Serial terminals usually want this; a
    /// telnet client turns it on itself through option negotiation.
    pub local_echo: bool,
    /// Print period of `watch` and `watchcsv`.
    pub watch_interval_ms: u32,
    /// Date column of `ll` listings.
    pub build_date: String<MAX_BUILD_DATE_LEN>,
    /// Append a CRC-32 to the parameter block written by `savepar` and
    /// check it in `loadpar`.
    pub param_checksum: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            host_name: bounded(DEFAULT_HOST_NAME).unwrap_or_default(),
            local_echo: true,
            watch_interval_ms: DEFAULT_WATCH_INTERVAL_MS,
            build_date: bounded(DEFAULT_BUILD_DATE).unwrap_or_default(),
            param_checksum: false,
        }
    }
}

impl ShellConfig {
    /// Default configuration with the given host name.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] when the name is longer than
    /// [`MAX_HOST_NAME_LEN`].
    pub fn new(host_name: &str) -> Result<Self, Error> {
        Self::default().with_host_name(host_name)
    }

    /// Parse a JSON object. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for malformed JSON, unknown field types or
    /// strings that do not fit their bounded fields.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let (config, _) = serde_json_core::from_str::<ShellConfig>(json).map_err(|_| {
            warn!("config: rejected JSON document");
            Error::InvalidConfig
        })?;
        Ok(config)
    }

    /// Replace the host name.
    pub fn with_host_name(mut self, host_name: &str) -> Result<Self, Error> {
        self.host_name = bounded(host_name)?;
        Ok(self)
    }

    /// Replace the `ll` date stamp.
    pub fn with_build_date(mut self, build_date: &str) -> Result<Self, Error> {
        self.build_date = bounded(build_date)?;
        Ok(self)
    }

    /// Enable or disable local echo.
    pub fn with_local_echo(mut self, enabled: bool) -> Self {
        self.local_echo = enabled;
        self
    }

    /// Change the watch period.
    pub fn with_watch_interval(mut self, interval_ms: u32) -> Self {
        self.watch_interval_ms = interval_ms;
        self
    }

    /// Enable or disable the parameter block checksum.
    pub fn with_param_checksum(mut self, enabled: bool) -> Self {
        self.param_checksum = enabled;
        self
    }
}

fn bounded<const N: usize>(text: &str) -> Result<String<N>, Error> {
    String::try_from(text).map_err(|_| Error::CapacityExceeded)
}
