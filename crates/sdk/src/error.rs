use alloy::{primitives::Address, transports::TransportError};
use thiserror::Error;

/// Errors produced while resolving, verifying or reading the launchpad
/// factory.
#[derive(Debug, Error)]
pub enum LaunchpadError {
    /// Deployment config has no entry for the connected chain.
    #[error("no factory deployment configured for chain {chain_id}")]
    UnsupportedNetwork { chain_id: u64 },

    /// Configured factory address carries no code on the connected chain.
    #[error("no contract code at factory {address} on chain {chain_id}")]
    ContractNotDeployed { chain_id: u64, address: Address },

    /// One of the factory read calls failed or reverted.
    #[error("factory read `{method}` failed: {reason}")]
    ReadCall { method: &'static str, reason: String },

    /// Provider-level request failed (chain id, code, block queries).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("ABI decoding failed: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    /// Deployment config or image table could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A later synchronization started before this one could publish.
    #[error("synchronization #{seq} superseded by #{latest}")]
    Superseded { seq: u64, latest: u64 },
}

impl LaunchpadError {
    pub(crate) fn read_call(method: &'static str, err: impl std::fmt::Display) -> Self {
        Self::ReadCall { method, reason: err.to_string() }
    }

    /// Fieldless classification of the error, suitable for structured
    /// logging and diagnostics.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedNetwork { .. } => ErrorKind::UnsupportedNetwork,
            Self::ContractNotDeployed { .. } => ErrorKind::ContractNotDeployed,
            Self::ReadCall { .. } | Self::Decode(_) => ErrorKind::ReadCallFailure,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Config(_) => ErrorKind::Config,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Superseded { .. } => ErrorKind::Superseded,
        }
    }
}

impl From<serde_json::Error> for LaunchpadError {
    fn from(err: serde_json::Error) -> Self { Self::Config(err.to_string()) }
}

/// Kind of [`LaunchpadError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedNetwork,
    ContractNotDeployed,
    ReadCallFailure,
    Transport,
    Config,
    InvalidArgument,
    Superseded,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedNetwork => "unsupported_network",
            ErrorKind::ContractNotDeployed => "contract_not_deployed",
            ErrorKind::ReadCallFailure => "read_call_failure",
            ErrorKind::Transport => "transport",
            ErrorKind::Config => "config",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Superseded => "superseded",
        }
    }

    /// Whether the factory is simply unavailable on the connected chain, as
    /// opposed to a read having failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ErrorKind::UnsupportedNetwork | ErrorKind::ContractNotDeployed)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}
