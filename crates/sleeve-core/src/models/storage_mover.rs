//! Storage Mover - endpoints

use serde::{Deserialize, Serialize};

use crate::app::{BuildError, CodecBuilder};
use crate::domain::{DiscriminatorSource, EnvelopeKind, FieldType, Presence};
use crate::typed::Variant;

pub const ENDPOINT_KIND: &str = "storage_mover.endpoint";

/// Endpoint の envelope 宣言（`properties` は必須）
pub fn endpoint_kind() -> EnvelopeKind {
    EnvelopeKind::new(ENDPOINT_KIND)
        .fixed("id", FieldType::String, Presence::Optional)
        .fixed("name", FieldType::String, Presence::Optional)
        .fixed("type", FieldType::String, Presence::Optional)
        .fixed("systemData", FieldType::Object, Presence::Optional)
        .slot("properties")
        .require_slot()
        .discriminator(DiscriminatorSource::Inner("endpointType".to_string()))
}

pub fn register(builder: CodecBuilder) -> Result<CodecBuilder, BuildError> {
    Ok(builder
        .kind(endpoint_kind())?
        .register::<AzureStorageBlobContainerEndpointProperties>(ENDPOINT_KIND)?
        .register::<NfsMountEndpointProperties>(ENDPOINT_KIND)?
        .expect_variants(
            ENDPOINT_KIND,
            &[
                AzureStorageBlobContainerEndpointProperties::DISCRIMINATOR,
                NfsMountEndpointProperties::DISCRIMINATOR,
            ],
        ))
}

/// NFS のバージョン（知らない値は `Other` のまま往復する）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NfsVersion {
    NfsAuto,
    NfsV3,
    NfsV4,
    Other(String),
}

impl NfsVersion {
    pub fn as_str(&self) -> &str {
        match self {
            NfsVersion::NfsAuto => "NFSauto",
            NfsVersion::NfsV3 => "NFSv3",
            NfsVersion::NfsV4 => "NFSv4",
            NfsVersion::Other(s) => s,
        }
    }
}

impl From<String> for NfsVersion {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NFSauto" => NfsVersion::NfsAuto,
            "NFSv3" => NfsVersion::NfsV3,
            "NFSv4" => NfsVersion::NfsV4,
            _ => NfsVersion::Other(s),
        }
    }
}

impl From<NfsVersion> for String {
    fn from(version: NfsVersion) -> Self {
        match version {
            NfsVersion::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureStorageBlobContainerEndpointProperties {
    pub storage_account_resource_id: String,
    pub blob_container_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// サーバー側でのみ設定される
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Variant for AzureStorageBlobContainerEndpointProperties {
    const DISCRIMINATOR: &'static str = "AzureStorageBlobContainer";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfsMountEndpointProperties {
    pub host: String,
    pub export: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nfs_version: Option<NfsVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Variant for NfsMountEndpointProperties {
    const DISCRIMINATOR: &'static str = "NfsMount";
}
