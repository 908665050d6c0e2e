//! Digital Twins - endpoints

use serde::{Deserialize, Serialize};

use crate::app::{BuildError, CodecBuilder};
use crate::domain::{DiscriminatorSource, EnvelopeKind, FieldType, Presence};
use crate::typed::Variant;

pub const ENDPOINT_KIND: &str = "digital_twins.endpoint";

pub fn endpoint_kind() -> EnvelopeKind {
    EnvelopeKind::new(ENDPOINT_KIND)
        .fixed("id", FieldType::String, Presence::Optional)
        .fixed("name", FieldType::String, Presence::Optional)
        .fixed("type", FieldType::String, Presence::Optional)
        .slot("properties")
        .discriminator(DiscriminatorSource::Inner("endpointType".to_string()))
}

pub fn register(builder: CodecBuilder) -> Result<CodecBuilder, BuildError> {
    Ok(builder
        .kind(endpoint_kind())?
        .register::<EventHubEndpointProperties>(ENDPOINT_KIND)?
        .register::<ServiceBusEndpointProperties>(ENDPOINT_KIND)?
        .register::<EventGridEndpointProperties>(ENDPOINT_KIND)?
        .expect_variants(
            ENDPOINT_KIND,
            &[
                EventHubEndpointProperties::DISCRIMINATOR,
                ServiceBusEndpointProperties::DISCRIMINATOR,
                EventGridEndpointProperties::DISCRIMINATOR,
            ],
        ))
}

/// 認証方式（知らない値は `Other` のまま往復する）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthenticationType {
    KeyBased,
    IdentityBased,
    Other(String),
}

impl AuthenticationType {
    pub fn as_str(&self) -> &str {
        match self {
            AuthenticationType::KeyBased => "KeyBased",
            AuthenticationType::IdentityBased => "IdentityBased",
            AuthenticationType::Other(s) => s,
        }
    }
}

impl From<String> for AuthenticationType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "KeyBased" => AuthenticationType::KeyBased,
            "IdentityBased" => AuthenticationType::IdentityBased,
            _ => AuthenticationType::Other(s),
        }
    }
}

impl From<AuthenticationType> for String {
    fn from(kind: AuthenticationType) -> Self {
        match kind {
            AuthenticationType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// endpoint 共通のフィールド
///
/// `createdTime` は受け取った文字列のまま持つ（秒以下の桁数を変えないため）。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointCommon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<AuthenticationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_letter_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_letter_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHubEndpointProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string_primary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string_secondary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_path: Option<String>,
    #[serde(flatten)]
    pub common: EndpointCommon,
}

impl Variant for EventHubEndpointProperties {
    const DISCRIMINATOR: &'static str = "EventHub";
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBusEndpointProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_path: Option<String>,
    #[serde(flatten)]
    pub common: EndpointCommon,
}

impl Variant for ServiceBusEndpointProperties {
    const DISCRIMINATOR: &'static str = "ServiceBus";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGridEndpointProperties {
    /// wire 上は先頭が大文字
    #[serde(rename = "TopicEndpoint")]
    pub topic_endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key2: Option<String>,
    #[serde(flatten)]
    pub common: EndpointCommon,
}

impl Variant for EventGridEndpointProperties {
    const DISCRIMINATOR: &'static str = "EventGrid";
}
