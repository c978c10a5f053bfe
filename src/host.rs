use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::env::XRAY_HOST_KIND_ENV;
use crate::error::HostKindParseError;

/// Port the collector listens on. Not configurable.
pub const COLLECTOR_PORT: u16 = 44827;

const LOCAL_HOST: &str = "localhost";
const DOCKER_HOST: &str = "host.docker.internal";

/// Where the collector is reachable from the logging process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    /// Collector on the same machine.
    #[default]
    Local,
    /// Process runs in a container and reaches the collector on the host.
    Docker,
}

impl HostKind {
    pub fn host(self) -> &'static str {
        match self {
            HostKind::Local => LOCAL_HOST,
            HostKind::Docker => DOCKER_HOST,
        }
    }

    /// `http://{host}:44827`
    pub fn base_url(self) -> String {
        format!("http://{}:{}", self.host(), COLLECTOR_PORT)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HostKind::Local => "local",
            HostKind::Docker => "docker",
        }
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostKind {
    type Err = HostKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(HostKind::Local),
            "docker" => Ok(HostKind::Docker),
            _ => Err(HostKindParseError(s.to_string())),
        }
    }
}

/// Construction options for [`crate::LogClient`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    #[serde(default)]
    pub host_kind: HostKind,
}

impl ClientOptions {
    pub fn new(host_kind: HostKind) -> Self {
        ClientOptions { host_kind }
    }

    /// Read options from `XRAY_HOST_KIND`. An unset variable selects
    /// [`HostKind::Local`]; an unrecognised value is an error.
    pub fn from_env() -> Result<Self, HostKindParseError> {
        match std::env::var(XRAY_HOST_KIND_ENV) {
            Ok(raw) => Ok(ClientOptions::new(raw.parse()?)),
            Err(_) => Ok(ClientOptions::default()),
        }
    }
}
