//! Container Registry - task run の `runRequest`
//!
//! slot は `properties` ではなく `runRequest`。

use serde::{Deserialize, Serialize};

use crate::app::{BuildError, CodecBuilder};
use crate::domain::{DiscriminatorSource, EnvelopeKind, FieldType, Presence};
use crate::typed::Variant;

pub const TASK_RUN_UPDATE_KIND: &str = "container_registry.task_run_update";

pub fn task_run_update_kind() -> EnvelopeKind {
    EnvelopeKind::new(TASK_RUN_UPDATE_KIND)
        .fixed("forceUpdateTag", FieldType::String, Presence::Optional)
        .slot("runRequest")
        .discriminator(DiscriminatorSource::Inner("type".to_string()))
}

pub fn register(builder: CodecBuilder) -> Result<CodecBuilder, BuildError> {
    Ok(builder
        .kind(task_run_update_kind())?
        .register::<DockerBuildRequest>(TASK_RUN_UPDATE_KIND)?
        .register::<EncodedTaskRunRequest>(TASK_RUN_UPDATE_KIND)?
        .register::<FileTaskRunRequest>(TASK_RUN_UPDATE_KIND)?
        .register::<TaskRunRequest>(TASK_RUN_UPDATE_KIND)?
        .expect_variants(
            TASK_RUN_UPDATE_KIND,
            &[
                DockerBuildRequest::DISCRIMINATOR,
                EncodedTaskRunRequest::DISCRIMINATOR,
                FileTaskRunRequest::DISCRIMINATOR,
                TaskRunRequest::DISCRIMINATOR,
            ],
        ))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformProperties {
    pub os: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_secret: Option<bool>,
}

/// `values` の 1 要素（Encoded / File で共通）
pub type SetValue = Argument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i64>,
}

/// run request 共通のフィールド
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequestCommon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_pool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archive_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerBuildRequest {
    pub docker_file_path: String,
    pub platform: PlatformProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_push_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<Argument>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_configuration: Option<AgentProperties>,
    #[serde(flatten)]
    pub common: RunRequestCommon,
}

impl Variant for DockerBuildRequest {
    const DISCRIMINATOR: &'static str = "DockerBuildRequest";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedTaskRunRequest {
    pub encoded_task_content: String,
    pub platform: PlatformProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_values_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<SetValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_configuration: Option<AgentProperties>,
    #[serde(flatten)]
    pub common: RunRequestCommon,
}

impl Variant for EncodedTaskRunRequest {
    const DISCRIMINATOR: &'static str = "EncodedTaskRunRequest";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTaskRunRequest {
    pub task_file_path: String,
    pub platform: PlatformProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<SetValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_configuration: Option<AgentProperties>,
    #[serde(flatten)]
    pub common: RunRequestCommon,
}

impl Variant for FileTaskRunRequest {
    const DISCRIMINATOR: &'static str = "FileTaskRunRequest";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunRequest {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_task_step_properties: Option<serde_json::Value>,
    #[serde(flatten)]
    pub common: RunRequestCommon,
}

impl Variant for TaskRunRequest {
    const DISCRIMINATOR: &'static str = "TaskRunRequest";
}
