use super::error::ConfigError;
use crate::domain::PeerId;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Child process that speaks the endpoint protocol on stdio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
}

impl ProcessSpec {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerTransport {
    /// Spawn the endpoint as a child process and talk JSON-RPC over its stdio.
    Process(ProcessSpec),
    /// Run the endpoint inside this process through the same JSON-RPC dispatch.
    Embedded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerConfig {
    pub peer: PeerId,
    pub transport: PeerTransport,
}

impl PeerConfig {
    pub fn process(peer: PeerId, spec: ProcessSpec) -> Self {
        Self {
            peer,
            transport: PeerTransport::Process(spec),
        }
    }

    pub fn embedded(peer: PeerId) -> Self {
        Self {
            peer,
            transport: PeerTransport::Embedded,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawPeer {
    pub(crate) id: String,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    workdir: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub(crate) enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

pub(crate) fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

impl TryFrom<RawPeer> for PeerConfig {
    type Error = ConfigError;

    fn try_from(raw: RawPeer) -> Result<Self, Self::Error> {
        let peer: PeerId = raw.id.parse()?;
        let mode = raw.mode.as_deref().unwrap_or("process");
        match mode {
            "embedded" => Ok(PeerConfig::embedded(peer)),
            "process" => {
                let command = raw
                    .command
                    .as_deref()
                    .map(expand)
                    .filter(|command| !command.trim().is_empty())
                    .ok_or_else(|| ConfigError::MissingCommand {
                        peer: peer.to_string(),
                    })?;
                let spec = ProcessSpec {
                    command: PathBuf::from(command),
                    args: raw.args.iter().map(|arg| expand(arg)).collect(),
                    env: raw.env,
                    workdir: raw.workdir.map(|dir| PathBuf::from(expand(&dir))),
                };
                Ok(PeerConfig::process(peer, spec))
            }
            other => Err(ConfigError::UnknownMode {
                peer: peer.to_string(),
                mode: other.to_string(),
            }),
        }
    }
}
