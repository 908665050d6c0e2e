//! Recovery Services Backup - protectable items
//!
//! backup サービスは新しい item 種別を頻繁に追加するので、この kind だけは
//! passthrough を有効にしている。未知の種別は opaque な Slot として返る。

use serde::{Deserialize, Serialize};

use crate::app::{BuildError, CodecBuilder};
use crate::domain::{DiscriminatorSource, EnvelopeKind, FieldType, Presence};
use crate::typed::Variant;

pub const PROTECTABLE_ITEM_KIND: &str = "recovery_services.protectable_item";

pub fn protectable_item_kind() -> EnvelopeKind {
    EnvelopeKind::new(PROTECTABLE_ITEM_KIND)
        .fixed("eTag", FieldType::String, Presence::Optional)
        .fixed("id", FieldType::String, Presence::Optional)
        .fixed("location", FieldType::String, Presence::Optional)
        .fixed("name", FieldType::String, Presence::Optional)
        .fixed("tags", FieldType::StringMap, Presence::Optional)
        .fixed("type", FieldType::String, Presence::Optional)
        .slot("properties")
        .discriminator(DiscriminatorSource::Inner("protectableItemType".to_string()))
        .passthrough()
}

pub fn register(builder: CodecBuilder) -> Result<CodecBuilder, BuildError> {
    Ok(builder
        .kind(protectable_item_kind())?
        .register::<AzureFileShareProtectableItem>(PROTECTABLE_ITEM_KIND)?
        .register::<IaasClassicComputeVmProtectableItem>(PROTECTABLE_ITEM_KIND)?
        .register::<IaasComputeVmProtectableItem>(PROTECTABLE_ITEM_KIND)?
        .register::<AzureVmWorkloadSqlDatabaseProtectableItem>(PROTECTABLE_ITEM_KIND)?
        .expect_variants(
            PROTECTABLE_ITEM_KIND,
            &[
                AzureFileShareProtectableItem::DISCRIMINATOR,
                IaasClassicComputeVmProtectableItem::DISCRIMINATOR,
                IaasComputeVmProtectableItem::DISCRIMINATOR,
                AzureVmWorkloadSqlDatabaseProtectableItem::DISCRIMINATOR,
            ],
        ))
}

/// protectable item 共通のフィールド
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectableItemCommon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_management_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureFileShareProtectableItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_file_share_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_container_fabric_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_container_friendly_name: Option<String>,
    #[serde(flatten)]
    pub common: ProtectableItemCommon,
}

impl Variant for AzureFileShareProtectableItem {
    const DISCRIMINATOR: &'static str = "AzureFileShare";
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IaasVmProtectableItemProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_machine_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_machine_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(flatten)]
    pub common: ProtectableItemCommon,
}

/// クラシック VM（形は IaasComputeVm と同じで discriminator だけ違う）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IaasClassicComputeVmProtectableItem {
    #[serde(flatten)]
    pub vm: IaasVmProtectableItemProperties,
}

impl Variant for IaasClassicComputeVmProtectableItem {
    const DISCRIMINATOR: &'static str = "Microsoft.ClassicCompute/virtualMachines";
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IaasComputeVmProtectableItem {
    #[serde(flatten)]
    pub vm: IaasVmProtectableItemProperties,
}

impl Variant for IaasComputeVmProtectableItem {
    const DISCRIMINATOR: &'static str = "Microsoft.Compute/virtualMachines";
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureVmWorkloadSqlDatabaseProtectableItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_unique_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_auto_protectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_auto_protected: Option<bool>,
    /// wire 上は全部小文字
    #[serde(rename = "subprotectableitemcount", default, skip_serializing_if = "Option::is_none")]
    pub subprotectable_item_count: Option<i64>,
    #[serde(flatten)]
    pub common: ProtectableItemCommon,
}

impl Variant for AzureVmWorkloadSqlDatabaseProtectableItem {
    const DISCRIMINATOR: &'static str = "SQLDataBase";
}
