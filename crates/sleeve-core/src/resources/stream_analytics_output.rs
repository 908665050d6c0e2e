//! Stream Analytics output - フラットな設定モデル
//!
//! Envelope から読み戻すとき、リモートに無いフィールドはエラーにせず
//! 既定値（空文字・空リスト・バッチ設定の既定値）にする。
//! シークレット（`sharedAccessPolicyKey` / `password`）はリモートから返らないので読み戻さない。

use serde_json::Number;

use crate::domain::{Envelope, Slot};
use crate::models::stream_analytics::{
    AuthenticationMode, AzureSqlDatabaseOutputDataSource, EventHubOutputDataSource,
};

use super::ConfigError;

pub const DEFAULT_MAX_BATCH_COUNT: f64 = 10000.0;
pub const DEFAULT_MAX_WRITER_COUNT: f64 = 1.0;

fn string_or_default(v: Option<&String>) -> String {
    v.cloned().unwrap_or_default()
}

/// リモートの値はどんな文字列でもそのまま読み戻す
fn mode_or_default(v: Option<&AuthenticationMode>) -> String {
    v.map(|m| m.as_str().to_string()).unwrap_or_default()
}

/// 設定で書けるのは `ConnectionString` と `Msi` だけ（空文字は ConnectionString）
fn parse_mode(s: &str) -> Result<AuthenticationMode, ConfigError> {
    match s {
        "" | "ConnectionString" => Ok(AuthenticationMode::ConnectionString),
        "Msi" => Ok(AuthenticationMode::Msi),
        _ => Err(ConfigError::InvalidValue {
            field: "authentication_mode",
            value: s.to_string(),
        }),
    }
}

fn number(field: &'static str, v: f64) -> Result<Number, ConfigError> {
    Number::from_f64(v).ok_or_else(|| ConfigError::InvalidValue {
        field,
        value: v.to_string(),
    })
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// EventHub output の設定
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventHubOutputConfig {
    pub name: String,
    pub eventhub_name: String,
    pub servicebus_namespace: String,
    pub shared_access_policy_name: String,
    /// 書き込み専用
    pub shared_access_policy_key: String,
    pub property_columns: Vec<String>,
    pub partition_key: String,
    pub authentication_mode: String,
}

impl EventHubOutputConfig {
    /// slot が EventHub でなければ `None`
    pub fn from_envelope(envelope: &Envelope) -> Option<Self> {
        let ds = envelope.variant::<EventHubOutputDataSource>()?;
        Some(Self {
            name: envelope.name().unwrap_or_default().to_string(),
            eventhub_name: string_or_default(ds.event_hub_name.as_ref()),
            servicebus_namespace: string_or_default(ds.service_bus_namespace.as_ref()),
            shared_access_policy_name: string_or_default(ds.shared_access_policy_name.as_ref()),
            shared_access_policy_key: String::new(),
            property_columns: ds.property_columns.clone().unwrap_or_default(),
            partition_key: string_or_default(ds.partition_key.as_ref()),
            authentication_mode: mode_or_default(ds.authentication_mode.as_ref()),
        })
    }

    /// リクエスト用の Envelope
    pub fn to_envelope(&self) -> Result<Envelope, ConfigError> {
        let ds = EventHubOutputDataSource {
            event_hub_name: Some(self.eventhub_name.clone()),
            service_bus_namespace: Some(self.servicebus_namespace.clone()),
            shared_access_policy_name: non_empty(&self.shared_access_policy_name),
            shared_access_policy_key: non_empty(&self.shared_access_policy_key),
            partition_key: Some(self.partition_key.clone()),
            property_columns: Some(self.property_columns.clone()),
            authentication_mode: Some(parse_mode(&self.authentication_mode)?),
        };
        Ok(Envelope::new()
            .with_field("name", self.name.clone())
            .with_slot(Slot::known(ds)))
    }
}

/// SQL Database output の設定
#[derive(Debug, Clone, PartialEq)]
pub struct SqlOutputConfig {
    pub name: String,
    pub server: String,
    pub database: String,
    pub table: String,
    pub user: String,
    /// 書き込み専用
    pub password: String,
    pub max_batch_count: f64,
    pub max_writer_count: f64,
    pub authentication_mode: String,
}

impl Default for SqlOutputConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            server: String::new(),
            database: String::new(),
            table: String::new(),
            user: String::new(),
            password: String::new(),
            max_batch_count: DEFAULT_MAX_BATCH_COUNT,
            max_writer_count: DEFAULT_MAX_WRITER_COUNT,
            authentication_mode: AuthenticationMode::ConnectionString.as_str().to_string(),
        }
    }
}

impl SqlOutputConfig {
    pub fn from_envelope(envelope: &Envelope) -> Option<Self> {
        let ds = envelope.variant::<AzureSqlDatabaseOutputDataSource>()?;
        Some(Self {
            name: envelope.name().unwrap_or_default().to_string(),
            server: string_or_default(ds.server.as_ref()),
            database: string_or_default(ds.database.as_ref()),
            table: string_or_default(ds.table.as_ref()),
            user: string_or_default(ds.user.as_ref()),
            password: String::new(),
            max_batch_count: ds
                .max_batch_count
                .as_ref()
                .and_then(Number::as_f64)
                .unwrap_or(DEFAULT_MAX_BATCH_COUNT),
            max_writer_count: ds
                .max_writer_count
                .as_ref()
                .and_then(Number::as_f64)
                .unwrap_or(DEFAULT_MAX_WRITER_COUNT),
            authentication_mode: mode_or_default(ds.authentication_mode.as_ref()),
        })
    }

    /// リクエスト用の Envelope
    ///
    /// `user` / `password` は ConnectionString 認証のときだけ送る。
    pub fn to_envelope(&self) -> Result<Envelope, ConfigError> {
        let mode = parse_mode(&self.authentication_mode)?;
        let (user, password) = match mode {
            AuthenticationMode::ConnectionString => {
                (Some(self.user.clone()), Some(self.password.clone()))
            }
            _ => (None, None),
        };
        let ds = AzureSqlDatabaseOutputDataSource {
            server: Some(self.server.clone()),
            database: Some(self.database.clone()),
            table: Some(self.table.clone()),
            user,
            password,
            max_batch_count: Some(number("max_batch_count", self.max_batch_count)?),
            max_writer_count: Some(number("max_writer_count", self.max_writer_count)?),
            authentication_mode: Some(mode),
        };
        Ok(Envelope::new()
            .with_field("name", self.name.clone())
            .with_slot(Slot::known(ds)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog;
    use crate::models::stream_analytics::OUTPUT_KIND;
    use serde_json::json;

    #[test]
    fn event_hub_absent_fields_read_back_as_defaults() {
        let codec = catalog::codec().unwrap();
        let envelope = codec
            .decode_value(
                OUTPUT_KIND,
                json!({
                    "name": "out",
                    "properties": {"datasourceType": "Microsoft.ServiceBus/EventHub", "eventHubName": "hub"}
                }),
            )
            .unwrap();

        let config = EventHubOutputConfig::from_envelope(&envelope).unwrap();
        assert_eq!(
            config,
            EventHubOutputConfig {
                name: "out".into(),
                eventhub_name: "hub".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn other_variants_are_not_read_as_event_hub() {
        let codec = catalog::codec().unwrap();
        let envelope = codec
            .decode_value(
                OUTPUT_KIND,
                json!({"properties": {"datasourceType": "Microsoft.Sql/Server/Database"}}),
            )
            .unwrap();
        assert!(EventHubOutputConfig::from_envelope(&envelope).is_none());
        assert!(SqlOutputConfig::from_envelope(&envelope).is_some());
        assert!(EventHubOutputConfig::from_envelope(&Envelope::new()).is_none());
    }

    #[test]
    fn event_hub_request_omits_empty_secrets() {
        let config = EventHubOutputConfig {
            name: "out".into(),
            eventhub_name: "hub".into(),
            servicebus_namespace: "ns".into(),
            property_columns: vec!["col".into()],
            ..Default::default()
        };
        let envelope = config.to_envelope().unwrap();
        let encoded = catalog::codec().unwrap().encode_value(OUTPUT_KIND, &envelope).unwrap();
        assert_eq!(
            encoded,
            json!({
                "name": "out",
                "properties": {
                    "datasourceType": "Microsoft.ServiceBus/EventHub",
                    "eventHubName": "hub",
                    "serviceBusNamespace": "ns",
                    "partitionKey": "",
                    "propertyColumns": ["col"],
                    "authenticationMode": "ConnectionString"
                }
            })
        );
    }

    #[test]
    fn event_hub_config_survives_a_round_trip_except_the_key() {
        let config = EventHubOutputConfig {
            name: "out".into(),
            eventhub_name: "hub".into(),
            servicebus_namespace: "ns".into(),
            shared_access_policy_name: "policy".into(),
            shared_access_policy_key: "secret".into(),
            property_columns: vec![],
            partition_key: "pk".into(),
            authentication_mode: "Msi".into(),
        };
        let codec = catalog::codec().unwrap();
        let body = codec.encode(OUTPUT_KIND, &config.to_envelope().unwrap()).unwrap();
        let read_back = EventHubOutputConfig::from_envelope(&codec.decode(OUTPUT_KIND, &body).unwrap()).unwrap();

        assert_eq!(
            read_back,
            EventHubOutputConfig {
                shared_access_policy_key: String::new(),
                ..config
            }
        );
    }

    #[test]
    fn remote_only_modes_are_read_back_verbatim() {
        let codec = catalog::codec().unwrap();
        for mode in ["UserToken", "SomeFutureMode"] {
            let envelope = codec
                .decode_value(
                    OUTPUT_KIND,
                    json!({"properties": {"datasourceType": "Microsoft.ServiceBus/EventHub", "authenticationMode": mode}}),
                )
                .unwrap();
            let config = EventHubOutputConfig::from_envelope(&envelope).unwrap();
            assert_eq!(config.authentication_mode, mode);
            assert!(config.to_envelope().is_err());
        }
    }

    #[test]
    fn sql_defaults_for_missing_batch_settings() {
        let codec = catalog::codec().unwrap();
        let envelope = codec
            .decode_value(
                OUTPUT_KIND,
                json!({"properties": {"datasourceType": "Microsoft.Sql/Server/Database", "server": "srv"}}),
            )
            .unwrap();
        let config = SqlOutputConfig::from_envelope(&envelope).unwrap();
        assert_eq!(config.server, "srv");
        assert_eq!(config.max_batch_count, DEFAULT_MAX_BATCH_COUNT);
        assert_eq!(config.max_writer_count, DEFAULT_MAX_WRITER_COUNT);
        assert_eq!(config.authentication_mode, "");
        assert_eq!(config.user, "");
    }

    #[test]
    fn sql_credentials_only_sent_for_connection_string() {
        let config = SqlOutputConfig {
            user: "admin".into(),
            password: "secret".into(),
            authentication_mode: "Msi".into(),
            ..Default::default()
        };
        let envelope = config.to_envelope().unwrap();
        let ds = envelope.variant::<AzureSqlDatabaseOutputDataSource>().unwrap();
        assert_eq!(ds.user, None);
        assert_eq!(ds.password, None);

        let config = SqlOutputConfig {
            authentication_mode: "ConnectionString".into(),
            ..config
        };
        let envelope = config.to_envelope().unwrap();
        let ds = envelope.variant::<AzureSqlDatabaseOutputDataSource>().unwrap();
        assert_eq!(ds.user.as_deref(), Some("admin"));
        assert_eq!(ds.password.as_deref(), Some("secret"));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        for mode in ["Kerberos", "UserToken"] {
            let config = SqlOutputConfig {
                authentication_mode: mode.into(),
                ..Default::default()
            };
            assert!(matches!(
                config.to_envelope(),
                Err(ConfigError::InvalidValue { field: "authentication_mode", .. })
            ));
        }

        let config = SqlOutputConfig {
            max_batch_count: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.to_envelope(),
            Err(ConfigError::InvalidValue { field: "max_batch_count", .. })
        ));
    }
}
