//! Core types for Oke
//!
//! Field names on the wire follow the web front end (`tokenId`, `isSbt`,
//! `external_url`, ...) so state dumps and action logs can be exchanged
//! with it unchanged.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StateError;

/// A minted token as displayed in the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub image: String,
    pub name: String,
    pub description: String,
    pub transcript: String,
    pub token_id: u64,
    pub contract_address: String,
    /// Soulbound (non-transferable) token
    pub is_sbt: bool,
    #[serde(rename = "external_url")]
    pub external_url: String,
}

/// Top-level page of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Home,
    Collection,
    Creator,
    Detail,
    MidoriCard,
}

impl View {
    /// Stable key under which per-view state is persisted
    pub fn storage_key(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Collection => "collection",
            View::Creator => "creator",
            View::Detail => "detail",
            View::MidoriCard => "midori_card",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(View::Home),
            "collection" => Ok(View::Collection),
            "creator" => Ok(View::Creator),
            "detail" => Ok(View::Detail),
            "midori_card" => Ok(View::MidoriCard),
            other => Err(format!(
                "Invalid view: '{}'. Valid options: home, collection, creator, detail, midori_card",
                other
            )),
        }
    }
}

/// User-supplied asset attached to a mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFile {
    pub name: String,
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl AssetFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the MIME type from its extension.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "asset".to_string());
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(mime_from_extension)
            .unwrap_or("application/octet-stream");
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

fn mime_from_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// In-progress minting draft; persisted so it survives a reload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorState {
    pub file: Option<AssetFile>,
    pub transcript: String,
    pub options_checked: bool,
}

impl CreatorState {
    /// Shallow merge: fields absent from the patch are kept.
    pub fn merged(self, patch: CreatorStatePatch) -> Self {
        Self {
            file: patch.file.unwrap_or(self.file),
            transcript: patch.transcript.unwrap_or(self.transcript),
            options_checked: patch.options_checked.unwrap_or(self.options_checked),
        }
    }
}

/// Partial update of [`CreatorState`]
///
/// `file` is doubly optional: `None` leaves the file alone, `Some(None)`
/// clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorStatePatch {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub file: Option<Option<AssetFile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_checked: Option<bool>,
}

impl CreatorStatePatch {
    pub fn transcript(transcript: impl Into<String>) -> Self {
        Self {
            transcript: Some(transcript.into()),
            ..Default::default()
        }
    }

    pub fn file(file: Option<AssetFile>) -> Self {
        Self {
            file: Some(file),
            ..Default::default()
        }
    }

    pub fn options_checked(checked: bool) -> Self {
        Self {
            options_checked: Some(checked),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.transcript.is_none() && self.options_checked.is_none()
    }
}

impl From<CreatorState> for CreatorStatePatch {
    fn from(state: CreatorState) -> Self {
        Self {
            file: Some(state.file),
            transcript: Some(state.transcript),
            options_checked: Some(state.options_checked),
        }
    }
}

// A key that is present maps to Some(..) even when its value is null.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Connection a wallet reads chain data through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderHandle {
    pub endpoint: String,
}

/// Signing capability of a connected wallet
///
/// Only a descriptor; key material never enters application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerHandle {
    pub address: String,
}

/// Wallet connection snapshot
///
/// `address` is present exactly when `signer` is. Every constructor
/// (deserialization included) upholds this.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Web3StateRepr", into = "Web3StateRepr")]
pub struct Web3State {
    address: Option<String>,
    chain_id: Option<u64>,
    provider: Option<ProviderHandle>,
    signer: Option<SignerHandle>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Web3StateRepr {
    address: Option<String>,
    chain_id: Option<u64>,
    provider: Option<ProviderHandle>,
    signer: Option<SignerHandle>,
}

impl TryFrom<Web3StateRepr> for Web3State {
    type Error = StateError;

    fn try_from(repr: Web3StateRepr) -> Result<Self, Self::Error> {
        Web3State::new(repr.address, repr.chain_id, repr.provider, repr.signer)
    }
}

impl From<Web3State> for Web3StateRepr {
    fn from(state: Web3State) -> Self {
        Self {
            address: state.address,
            chain_id: state.chain_id,
            provider: state.provider,
            signer: state.signer,
        }
    }
}

impl Web3State {
    /// Validating constructor.
    pub fn new(
        address: Option<String>,
        chain_id: Option<u64>,
        provider: Option<ProviderHandle>,
        signer: Option<SignerHandle>,
    ) -> Result<Self, StateError> {
        match (&address, &signer) {
            (Some(_), None) => {
                return Err(StateError::InvalidWeb3State(
                    "address present without a signer".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(StateError::InvalidWeb3State(
                    "signer present without an address".to_string(),
                ))
            }
            _ => {}
        }

        Ok(Self {
            address,
            chain_id,
            provider,
            signer,
        })
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(chain_id: u64, provider: ProviderHandle, signer: SignerHandle) -> Self {
        Self {
            address: Some(signer.address.clone()),
            chain_id: Some(chain_id),
            provider: Some(provider),
            signer: Some(signer),
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn provider(&self) -> Option<&ProviderHandle> {
        self.provider.as_ref()
    }

    pub fn signer(&self) -> Option<&SignerHandle> {
        self.signer.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.signer.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Info,
    Error,
    Success,
}

/// Message shown after a mint attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintingStatus {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: StatusKind,
}

impl MintingStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Success,
        }
    }
}

/// Snapshot frozen when the mint modal opens
///
/// Duplicates fields held elsewhere in [`crate::app::AppState`]; the copies
/// may diverge once the mint proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintingData {
    pub is_open: bool,
    pub file: Option<AssetFile>,
    pub transcript: String,
    pub email: Option<String>,
    pub web3_state: Web3State,
}
