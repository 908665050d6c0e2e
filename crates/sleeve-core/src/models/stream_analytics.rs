//! Stream Analytics - output datasources と functions
//!
//! wire 上のフィールド名・discriminator はリモート API と完全一致させる。

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::app::{BuildError, CodecBuilder};
use crate::domain::{DiscriminatorSource, EnvelopeKind, FieldType, Presence};
use crate::typed::Variant;

pub const OUTPUT_KIND: &str = "stream_analytics.output";
pub const FUNCTION_KIND: &str = "stream_analytics.function";

/// Output の envelope 宣言
pub fn output_kind() -> EnvelopeKind {
    EnvelopeKind::new(OUTPUT_KIND)
        .fixed("id", FieldType::String, Presence::Optional)
        .fixed("name", FieldType::String, Presence::Optional)
        .fixed("type", FieldType::String, Presence::Optional)
        .slot("properties")
        .discriminator(DiscriminatorSource::Inner("datasourceType".to_string()))
}

/// Function の envelope 宣言
pub fn function_kind() -> EnvelopeKind {
    EnvelopeKind::new(FUNCTION_KIND)
        .fixed("id", FieldType::String, Presence::Optional)
        .fixed("name", FieldType::String, Presence::Optional)
        .fixed("type", FieldType::String, Presence::Optional)
        .slot("properties")
        .discriminator(DiscriminatorSource::Inner("type".to_string()))
}

pub fn register(builder: CodecBuilder) -> Result<CodecBuilder, BuildError> {
    Ok(builder
        .kind(output_kind())?
        .register::<EventHubOutputDataSource>(OUTPUT_KIND)?
        .register::<AzureSqlDatabaseOutputDataSource>(OUTPUT_KIND)?
        .expect_variants(
            OUTPUT_KIND,
            &[
                EventHubOutputDataSource::DISCRIMINATOR,
                AzureSqlDatabaseOutputDataSource::DISCRIMINATOR,
            ],
        )
        .kind(function_kind())?
        .register::<ScalarFunctionProperties>(FUNCTION_KIND)?
        .register::<AggregateFunctionProperties>(FUNCTION_KIND)?
        .expect_variants(
            FUNCTION_KIND,
            &[
                ScalarFunctionProperties::DISCRIMINATOR,
                AggregateFunctionProperties::DISCRIMINATOR,
            ],
        ))
}

/// 認証モード
///
/// サービス側が値を増やしても decode が失敗しないよう、知らない値は
/// `Other` としてそのまま持ち、そのまま書き戻す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthenticationMode {
    ConnectionString,
    Msi,
    UserToken,
    Other(String),
}

impl AuthenticationMode {
    pub fn as_str(&self) -> &str {
        match self {
            AuthenticationMode::ConnectionString => "ConnectionString",
            AuthenticationMode::Msi => "Msi",
            AuthenticationMode::UserToken => "UserToken",
            AuthenticationMode::Other(s) => s,
        }
    }
}

impl From<String> for AuthenticationMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ConnectionString" => AuthenticationMode::ConnectionString,
            "Msi" => AuthenticationMode::Msi,
            "UserToken" => AuthenticationMode::UserToken,
            _ => AuthenticationMode::Other(s),
        }
    }
}

impl From<AuthenticationMode> for String {
    fn from(mode: AuthenticationMode) -> Self {
        match mode {
            AuthenticationMode::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHubOutputDataSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_hub_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_bus_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_access_policy_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_access_policy_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_mode: Option<AuthenticationMode>,
}

impl Variant for EventHubOutputDataSource {
    const DISCRIMINATOR: &'static str = "Microsoft.ServiceBus/EventHub";
}

/// SQL Database output
///
/// バッチ設定は `Number` のまま持つ（`10000` と `10000.0` を区別して書き戻すため）。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureSqlDatabaseOutputDataSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_count: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_writer_count: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_mode: Option<AuthenticationMode>,
}

impl Variant for AzureSqlDatabaseOutputDataSource {
    const DISCRIMINATOR: &'static str = "Microsoft.Sql/Server/Database";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_configuration_parameter: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

/// function の入出力とバインディング
///
/// `binding` 自体も `type` を持つ polymorphic な値だが、ここでは生の JSON のまま持つ。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<FunctionInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<FunctionOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarFunctionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<FunctionConfiguration>,
}

impl Variant for ScalarFunctionProperties {
    const DISCRIMINATOR: &'static str = "Scalar";
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateFunctionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<FunctionConfiguration>,
}

impl Variant for AggregateFunctionProperties {
    const DISCRIMINATOR: &'static str = "Aggregate";
}
