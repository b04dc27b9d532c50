//! Hardhat compilation artifacts
//!
//! Hardhat writes one JSON file per contract at
//! `artifacts/contracts/<Name>.sol/<Name>.json`; only the creation
//! bytecode is needed to deploy.

use std::path::{Path, PathBuf};

use alloy::primitives::{hex, Bytes};
use serde::Deserialize;

use crate::error::DeployError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardhatArtifact {
    #[serde(rename = "_format", default)]
    pub format: String,
    pub contract_name: String,
    #[serde(default)]
    pub source_name: String,
    pub bytecode: String,
}

impl HardhatArtifact {
    /// Creation bytecode as raw bytes.
    pub fn creation_code(&self) -> Result<Vec<u8>, DeployError> {
        let fail = |reason: String| DeployError::Artifact {
            contract: self.contract_name.clone(),
            reason,
        };

        let trimmed = self.bytecode.trim_start_matches("0x");
        if trimmed.is_empty() {
            return Err(fail(
                "empty bytecode (abstract contract or interface?)".to_string(),
            ));
        }
        if trimmed.contains("__$") {
            return Err(fail("bytecode has unlinked library references".to_string()));
        }

        hex::decode(trimmed).map_err(|e| fail(format!("invalid bytecode hex: {}", e)))
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, contract: &str) -> PathBuf {
        self.root
            .join("contracts")
            .join(format!("{}.sol", contract))
            .join(format!("{}.json", contract))
    }

    pub fn load(&self, contract: &str) -> Result<HardhatArtifact, DeployError> {
        let path = self.path_for(contract);
        let fail = |reason: String| DeployError::Artifact {
            contract: contract.to_string(),
            reason,
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| fail(format!("cannot read {}: {}", path.display(), e)))?;
        let artifact: HardhatArtifact = serde_json::from_str(&content)
            .map_err(|e| fail(format!("cannot parse {}: {}", path.display(), e)))?;

        if artifact.contract_name != contract {
            return Err(fail(format!(
                "{} describes contract '{}'",
                path.display(),
                artifact.contract_name
            )));
        }

        Ok(artifact)
    }

    /// Creation bytecode followed by ABI-encoded constructor arguments
    pub fn init_code(&self, contract: &str, constructor_args: &[u8]) -> Result<Bytes, DeployError> {
        let mut code = self.load(contract)?.creation_code()?;
        code.extend_from_slice(constructor_args);
        Ok(Bytes::from(code))
    }
}
