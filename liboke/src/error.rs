//! Error types for Oke

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OkeError>;

#[derive(Error, Debug)]
pub enum OkeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Deployment error: {0}")]
    Deploy(#[from] DeployError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl OkeError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            OkeError::InvalidInput(_) => 3,
            OkeError::State(StateError::UnknownAction { .. }) => 3,
            OkeError::State(StateError::MalformedAction(_)) => 3,
            OkeError::Wallet(_) => 2,
            OkeError::Deploy(DeployError::MissingSigner) => 2,
            OkeError::Deploy(DeployError::InvalidKey(_)) => 2,
            OkeError::State(_) => 1,
            OkeError::Deploy(_) => 1,
            OkeError::Config(_) => 1,
            OkeError::Storage(_) => 1,
            OkeError::Network(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed stored state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported stored state version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

/// Rejections raised at the store boundary
///
/// The reducer itself is total; these errors come from decoding actions
/// and from checking preconditions before an action is applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Unknown action kind '{kind}': {detail}")]
    UnknownAction { kind: String, detail: String },

    #[error("Malformed action: {0}")]
    MalformedAction(String),

    #[error("Item {0} is not part of the loaded collection")]
    UnknownItem(String),

    #[error("Invalid wallet state: {0}")]
    InvalidWeb3State(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Connection rejected: {0}")]
    Rejected(String),

    #[error("Wallet unavailable: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("No deployer key configured (set PRIVATE_KEY)")]
    MissingSigner,

    #[error("Invalid deployer key: {0}")]
    InvalidKey(String),

    #[error("Artifact error for {contract}: {reason}")]
    Artifact { contract: String, reason: String },

    #[error("RPC error during {step}: {reason}")]
    Rpc { step: String, reason: String },

    #[error("Transaction reverted during {step} (tx {tx_hash})")]
    Reverted { step: String, tx_hash: String },

    #[error("Node reports chain {found} but the network is configured for chain {expected}")]
    ChainMismatch { expected: u64, found: u64 },

    #[error("Deployment of {0} returned no contract address")]
    MissingContractAddress(String),

    #[error("Timed out after {timeout_ms} ms during {step}")]
    Timeout { step: String, timeout_ms: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = OkeError::InvalidInput("no recipient".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_unknown_action() {
        let error = OkeError::State(StateError::UnknownAction {
            kind: "EXPLODE".to_string(),
            detail: "unknown variant".to_string(),
        });
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_malformed_action() {
        let error = OkeError::State(StateError::MalformedAction(
            "key must be a string at line 1 column 2".to_string(),
        ));
        assert_eq!(error.exit_code(), 3);

        let unknown_item = OkeError::State(StateError::UnknownItem("9".to_string()));
        assert_eq!(unknown_item.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_wallet_and_signer_errors() {
        let wallet = OkeError::Wallet(WalletError::Rejected("user closed prompt".to_string()));
        assert_eq!(wallet.exit_code(), 2);

        let signer = OkeError::Deploy(DeployError::MissingSigner);
        assert_eq!(signer.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_deploy_failure() {
        let error = OkeError::Deploy(DeployError::Reverted {
            step: "grant OkeNFT MINTER_ROLE".to_string(),
            tx_hash: "0xabc".to_string(),
        });
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_unknown_item() {
        let error = OkeError::State(StateError::UnknownItem("42".to_string()));
        assert_eq!(
            error.to_string(),
            "State error: Item 42 is not part of the loaded collection"
        );
    }

    #[test]
    fn test_error_message_formatting_storage_version() {
        let error = StorageError::Version { found: 9, expected: 1 };
        assert_eq!(
            error.to_string(),
            "Unsupported stored state version 9 (expected 1)"
        );
    }

    #[test]
    fn test_error_conversion_from_config_error() {
        let config_error = ConfigError::UnknownNetwork("goerli".to_string());
        let oke_error: OkeError = config_error.into();

        match oke_error {
            OkeError::Config(ConfigError::UnknownNetwork(name)) => assert_eq!(name, "goerli"),
            other => panic!("Expected OkeError::Config, got {:?}", other),
        }
    }
}
