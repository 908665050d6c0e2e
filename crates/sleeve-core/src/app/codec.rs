//! Codec - Envelope の decode / encode
//!
//! # decode の流れ
//! 1. バイト列をキー順序付きの JSON オブジェクトとして読む
//! 2. slot フィールドを取り出し、残りを固定フィールドとして検証
//! 3. slot の内側（または隣）から discriminator を読む
//! 4. envelope kind の registry で descriptor を引いて decode
//!    （未登録なら passthrough か UnknownVariant）
//! 5. discriminator でタグ付けした Slot を Envelope に格納
//!
//! Codec は構築後に変更されない。内部に可変状態を持たないので
//! `Arc<Codec>` を複数スレッドから同時に使える。エラー時に途中まで
//! 組み立てた Envelope を返すことはない。

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::domain::{
    CodecError, DiscriminatorSource, Envelope, EnvelopeKind, Presence, Slot, SlotValue,
    UnknownFieldPolicy, UnknownFields,
};
use crate::typed::{VariantDescriptor, VariantRegistry, VariantValue};

/// envelope kind 1 つ分の宣言と registry
pub(crate) struct KindEntry {
    pub(crate) kind: EnvelopeKind,
    pub(crate) registry: VariantRegistry,
}

/// Codec は envelope kind ごとの registry を束ねた不変の変換器
///
/// # 使用例
/// ```ignore
/// let codec = CodecBuilder::new()
///     .kind(output_kind())?
///     .register::<EventHubOutput>("stream_analytics.output")?
///     .build()?;
///
/// let envelope = codec.decode("stream_analytics.output", &body)?;
/// let body = codec.encode("stream_analytics.output", &envelope)?;
/// ```
pub struct Codec {
    kinds: HashMap<String, KindEntry>,
}

impl Codec {
    pub(crate) fn new(kinds: HashMap<String, KindEntry>) -> Self {
        Self { kinds }
    }

    /// 登録済み envelope kind の名前（ソート済み）
    pub fn kinds(&self) -> Vec<String> {
        let mut names: Vec<String> = self.kinds.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn kind(&self, name: &str) -> Option<&EnvelopeKind> {
        self.kinds.get(name).map(|e| &e.kind)
    }

    pub fn registry(&self, name: &str) -> Option<&VariantRegistry> {
        self.kinds.get(name).map(|e| &e.registry)
    }

    fn entry(&self, name: &str) -> Result<&KindEntry, CodecError> {
        self.kinds
            .get(name)
            .ok_or_else(|| CodecError::UnknownKind(name.to_string()))
    }

    pub fn decode(&self, kind: &str, bytes: &[u8]) -> Result<Envelope, CodecError> {
        let entry = self.entry(kind)?;
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| CodecError::malformed(kind, None, e.to_string()))?;
        decode_entry(entry, value)
    }

    /// すでに parse 済みの JSON から decode
    pub fn decode_value(&self, kind: &str, value: Value) -> Result<Envelope, CodecError> {
        decode_entry(self.entry(kind)?, value)
    }

    pub fn encode(&self, kind: &str, envelope: &Envelope) -> Result<Vec<u8>, CodecError> {
        let value = self.encode_value(kind, envelope)?;
        serde_json::to_vec(&value).map_err(|e| CodecError::malformed(kind, None, e.to_string()))
    }

    pub fn encode_value(&self, kind: &str, envelope: &Envelope) -> Result<Value, CodecError> {
        encode_entry(self.entry(kind)?, envelope)
    }
}

fn decode_entry(entry: &KindEntry, value: Value) -> Result<Envelope, CodecError> {
    let kind = &entry.kind;
    let Value::Object(mut fields) = value else {
        return Err(CodecError::malformed(
            kind.name(),
            None,
            "expected a JSON object",
        ));
    };

    let slot_raw = fields.shift_remove(kind.slot_field());
    check_fixed_fields(kind, &fields)?;

    let slot = match slot_raw {
        None | Some(Value::Null) => {
            if kind.slot_required() {
                return Err(CodecError::malformed(
                    kind.name(),
                    Some(kind.slot_field()),
                    "required polymorphic field is missing",
                ));
            }
            None
        }
        Some(Value::Object(subtree)) => Some(decode_slot(entry, &fields, subtree)?),
        Some(_) => {
            return Err(CodecError::malformed(
                kind.name(),
                Some(kind.slot_field()),
                "expected an object",
            ));
        }
    };

    Ok(Envelope::from_parts(fields, slot))
}

fn check_fixed_fields(kind: &EnvelopeKind, fields: &Map<String, Value>) -> Result<(), CodecError> {
    for fixed in kind.fixed_fields() {
        match fields.get(&fixed.name) {
            None | Some(Value::Null) => {
                if fixed.presence == Presence::Required {
                    return Err(CodecError::malformed(
                        kind.name(),
                        Some(fixed.name.as_str()),
                        "required field is missing",
                    ));
                }
            }
            Some(value) if !fixed.field_type.accepts(value) => {
                return Err(CodecError::malformed(
                    kind.name(),
                    Some(fixed.name.as_str()),
                    format!("expected {}", fixed.field_type.name()),
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn decode_slot(
    entry: &KindEntry,
    fields: &Map<String, Value>,
    subtree: Map<String, Value>,
) -> Result<Slot, CodecError> {
    let kind = &entry.kind;
    let source = kind.discriminator_source();
    let raw_discriminator = match source {
        DiscriminatorSource::Inner(f) => subtree.get(f),
        DiscriminatorSource::Sibling(f) => fields.get(f),
    };
    let discriminator = match raw_discriminator {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => {
            return Err(CodecError::malformed(
                kind.name(),
                Some(source.field()),
                "cannot determine the variant: discriminator is missing",
            ));
        }
        Some(_) => {
            return Err(CodecError::malformed(
                kind.name(),
                Some(source.field()),
                "discriminator must be a string",
            ));
        }
    };

    let Some(descriptor) = entry.registry.get(&discriminator) else {
        if kind.allows_passthrough() {
            return Ok(Slot::opaque(discriminator, Value::Object(subtree)));
        }
        return Err(CodecError::UnknownVariant {
            kind: kind.name().to_string(),
            field: source.field().to_string(),
            discriminator,
        });
    };

    let subtree = Value::Object(subtree);
    let decoded = descriptor
        .decode(&subtree)
        .map_err(|e| CodecError::VariantDecode {
            kind: kind.name().to_string(),
            discriminator: discriminator.clone(),
            source: e,
        })?;

    let unknown_fields = match kind.unknown_field_policy() {
        UnknownFieldPolicy::Drop => UnknownFields::default(),
        UnknownFieldPolicy::Preserve => {
            let reencoded = descriptor
                .encode(decoded.as_ref())
                .map_err(|e| CodecError::VariantDecode {
                    kind: kind.name().to_string(),
                    discriminator: discriminator.clone(),
                    source: e,
                })?;
            leftover_fields(&subtree, &reencoded, source)
        }
    };

    Ok(Slot::from_boxed(discriminator, decoded).with_unknown_fields(unknown_fields))
}

/// 受信したサブツリーのうち、variant の再 encode に現れなかった部分（ネストを含む）
fn leftover_fields(
    subtree: &Value,
    reencoded: &Value,
    source: &DiscriminatorSource,
) -> UnknownFields {
    let Value::Object(received) = subtree else {
        return UnknownFields::default();
    };
    let empty = Map::new();
    let known = reencoded.as_object().unwrap_or(&empty);
    let mut unknown = UnknownFields::diff(received, known);
    if let DiscriminatorSource::Inner(f) = source {
        unknown.forget(f);
    }
    unknown
}

fn encode_entry(entry: &KindEntry, envelope: &Envelope) -> Result<Value, CodecError> {
    let kind = &entry.kind;
    let mut out = envelope.fields().clone();

    match envelope.slot() {
        Some(slot) => {
            let slot_value = match slot.value() {
                SlotValue::Opaque(raw) => raw.clone(),
                SlotValue::Known(value) => {
                    let descriptor = entry.registry.get(slot.discriminator()).ok_or_else(|| {
                        encode_error(kind, slot, "no variant is registered for this discriminator")
                    })?;
                    encode_known(kind, descriptor.as_ref(), slot, &**value)?
                }
            };
            if let DiscriminatorSource::Sibling(f) = kind.discriminator_source() {
                out.insert(f.clone(), Value::String(slot.discriminator().to_string()));
            }
            out.insert(kind.slot_field().to_string(), slot_value);
        }
        None if kind.slot_required() => {
            return Err(CodecError::malformed(
                kind.name(),
                Some(kind.slot_field()),
                "required polymorphic field is missing",
            ));
        }
        None => {}
    }

    Ok(Value::Object(out))
}

fn encode_known(
    kind: &EnvelopeKind,
    descriptor: &dyn VariantDescriptor,
    slot: &Slot,
    value: &dyn VariantValue,
) -> Result<Value, CodecError> {
    let encoded = descriptor
        .encode(value)
        .map_err(|e| encode_error(kind, slot, e.to_string()))?;
    let Value::Object(mut object) = encoded else {
        return Err(encode_error(kind, slot, "encoder must produce a JSON object"));
    };

    slot.unknown_fields().merge_into(&mut object);

    if let DiscriminatorSource::Inner(f) = kind.discriminator_source() {
        match object.get(f) {
            Some(Value::String(s)) if s == slot.discriminator() => {}
            None => {
                let mut tagged = Map::with_capacity(object.len() + 1);
                tagged.insert(f.clone(), Value::String(slot.discriminator().to_string()));
                tagged.extend(object);
                object = tagged;
            }
            Some(other) => {
                return Err(encode_error(
                    kind,
                    slot,
                    format!("encoder emitted discriminator {other} in field `{f}`"),
                ));
            }
        }
    }

    Ok(Value::Object(object))
}

fn encode_error(kind: &EnvelopeKind, slot: &Slot, reason: impl Into<String>) -> CodecError {
    CodecError::VariantEncode {
        kind: kind.name().to_string(),
        discriminator: slot.discriminator().to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::builder::CodecBuilder;
    use crate::domain::{FieldType, Presence};
    use crate::typed::Variant;
    use crate::typed::variant::fixtures::{EventHubOutput, SqlOutput, SqlProtectableItem};
    use rstest::rstest;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Arc;

    const OUTPUT: &str = "output";
    const ITEM: &str = "protectable_item";

    fn output_kind() -> EnvelopeKind {
        EnvelopeKind::new(OUTPUT)
            .fixed("id", FieldType::String, Presence::Optional)
            .fixed("name", FieldType::String, Presence::Optional)
            .fixed("partitionKey", FieldType::String, Presence::Optional)
            .discriminator(DiscriminatorSource::Inner("datasourceType".into()))
    }

    fn item_kind() -> EnvelopeKind {
        EnvelopeKind::new(ITEM)
            .fixed("id", FieldType::String, Presence::Required)
            .fixed("tags", FieldType::StringMap, Presence::Optional)
            .discriminator(DiscriminatorSource::Inner("protectableItemType".into()))
    }

    fn codec() -> Codec {
        CodecBuilder::new()
            .kind(output_kind())
            .unwrap()
            .kind(item_kind().passthrough())
            .unwrap()
            .register::<SqlOutput>(OUTPUT)
            .unwrap()
            .register::<EventHubOutput>(OUTPUT)
            .unwrap()
            .register::<SqlProtectableItem>(ITEM)
            .unwrap()
            .build()
            .unwrap()
    }

    fn bytes(v: Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    #[test]
    fn decodes_sql_scenario_and_reencodes_identically() {
        let input = json!({
            "id": "1",
            "properties": {"datasourceType": "Sql", "server": "s1", "database": "db1"}
        });
        let codec = codec();

        let envelope = codec.decode(OUTPUT, &bytes(input.clone())).unwrap();
        assert_eq!(envelope.id(), Some("1"));
        let slot = envelope.slot().unwrap();
        assert_eq!(slot.discriminator(), "Sql");
        assert_eq!(
            envelope.variant::<SqlOutput>(),
            Some(&SqlOutput {
                server: Some("s1".into()),
                database: Some("db1".into()),
            })
        );

        let encoded: Value = serde_json::from_slice(&codec.encode(OUTPUT, &envelope).unwrap()).unwrap();
        assert_eq!(encoded, input);
    }

    #[rstest]
    #[case::sql(json!({"name": "a", "properties": {"datasourceType": "Sql", "server": "s"}}))]
    #[case::event_hub(json!({"name": "b", "properties": {"datasourceType": "EventHub", "eventHubName": "hub", "partitionKey": "pk"}}))]
    #[case::no_slot(json!({"name": "c"}))]
    #[case::unknown_inner_fields(json!({"properties": {"datasourceType": "Sql", "server": "s", "futureField": {"x": [1, 2]}}}))]
    #[case::extra_top_level(json!({"etag": "W/1", "properties": {"datasourceType": "EventHub", "eventHubName": "hub"}}))]
    fn round_trip_is_stable(#[case] input: Value) {
        let codec = codec();
        let first = codec.decode_value(OUTPUT, input.clone()).unwrap();
        let encoded = codec.encode_value(OUTPUT, &first).unwrap();
        assert_eq!(encoded, input);

        let second = codec.decode_value(OUTPUT, encoded).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn event_hub_discriminator_is_reemitted_in_the_same_field() {
        let codec = codec();
        let envelope = codec
            .decode_value(
                OUTPUT,
                json!({"properties": {"datasourceType": "EventHub", "eventHubName": "hub"}}),
            )
            .unwrap();
        assert_eq!(envelope.slot().unwrap().discriminator(), "EventHub");

        let encoded = codec.encode_value(OUTPUT, &envelope).unwrap();
        assert_eq!(encoded["properties"]["datasourceType"], "EventHub");
    }

    #[test]
    fn hand_built_envelope_gets_its_discriminator() {
        let envelope = Envelope::new().with_field("name", "x").with_slot(Slot::known(EventHubOutput {
            event_hub_name: "hub".into(),
            partition_key: None,
        }));
        let encoded = codec().encode_value(OUTPUT, &envelope).unwrap();
        assert_eq!(
            encoded,
            json!({"name": "x", "properties": {"datasourceType": "EventHub", "eventHubName": "hub"}})
        );
    }

    #[test]
    fn same_discriminator_in_two_kinds_does_not_collide() {
        let codec = codec();
        let output = codec
            .decode_value(OUTPUT, json!({"properties": {"datasourceType": "Sql", "server": "s1"}}))
            .unwrap();
        let item = codec
            .decode_value(
                ITEM,
                json!({"id": "i", "properties": {"protectableItemType": "Sql", "friendlyName": "db", "instanceCount": 2}}),
            )
            .unwrap();

        assert!(output.variant::<SqlOutput>().is_some());
        assert!(output.variant::<SqlProtectableItem>().is_none());
        assert_eq!(item.variant::<SqlProtectableItem>().unwrap().instance_count, 2);
        assert!(item.variant::<SqlOutput>().is_none());
    }

    #[test]
    fn registering_only_one_kind_leaves_the_other_untouched() {
        let codec = CodecBuilder::new()
            .kind(output_kind())
            .unwrap()
            .kind(item_kind())
            .unwrap()
            .register::<SqlProtectableItem>(ITEM)
            .unwrap()
            .build()
            .unwrap();

        let err = codec
            .decode_value(OUTPUT, json!({"properties": {"datasourceType": "Sql"}}))
            .unwrap_err();
        assert!(matches!(err, CodecError::UnknownVariant { ref kind, .. } if kind == OUTPUT));
    }

    #[test]
    fn unknown_discriminator_without_fallback_fails() {
        let err = codec()
            .decode_value(OUTPUT, json!({"properties": {"datasourceType": "Unsupported123"}}))
            .unwrap_err();
        assert!(matches!(
            &err,
            CodecError::UnknownVariant { kind, field, discriminator }
                if kind == OUTPUT && field == "datasourceType" && discriminator == "Unsupported123"
        ));
        assert!(err.is_unknown_variant());
    }

    #[test]
    fn unknown_discriminator_with_fallback_passes_through() {
        let input = json!({
            "id": "i",
            "properties": {"protectableItemType": "Unsupported123", "anything": [1, {"a": null}]}
        });
        let codec = codec();
        let envelope = codec.decode_value(ITEM, input.clone()).unwrap();
        let slot = envelope.slot().unwrap();
        assert!(slot.is_opaque());
        assert_eq!(slot.discriminator(), "Unsupported123");

        assert_eq!(codec.encode_value(ITEM, &envelope).unwrap(), input);
    }

    #[test]
    fn missing_optional_field_reads_as_absent() {
        let envelope = codec().decode(OUTPUT, br#"{"name":"x"}"#).unwrap();
        assert_eq!(envelope.str_field("partitionKey"), None);
        assert_eq!(envelope.str_field("partitionKey").unwrap_or_default(), "");
        assert!(envelope.slot().is_none());
    }

    #[test]
    fn null_optional_field_is_kept_verbatim() {
        let input = json!({"name": null});
        let codec = codec();
        let envelope = codec.decode_value(OUTPUT, input.clone()).unwrap();
        assert_eq!(envelope.name(), None);
        assert_eq!(codec.encode_value(OUTPUT, &envelope).unwrap(), input);
    }

    #[rstest]
    #[case::not_json(b"{not json".to_vec(), None)]
    #[case::not_an_object(b"[1, 2]".to_vec(), None)]
    #[case::fixed_field_wrong_type(br#"{"name": 5}"#.to_vec(), Some("name"))]
    #[case::slot_not_an_object(br#"{"properties": "Sql"}"#.to_vec(), Some("properties"))]
    #[case::no_discriminator(br#"{"properties": {"server": "s1"}}"#.to_vec(), Some("datasourceType"))]
    #[case::discriminator_not_a_string(br#"{"properties": {"datasourceType": 7}}"#.to_vec(), Some("datasourceType"))]
    fn malformed_input_is_rejected(#[case] input: Vec<u8>, #[case] expected_field: Option<&str>) {
        let err = codec().decode(OUTPUT, &input).unwrap_err();
        match err {
            CodecError::MalformedEnvelope { kind, field, .. } => {
                assert_eq!(kind, OUTPUT);
                assert_eq!(field.as_deref(), expected_field);
            }
            other => panic!("expected MalformedEnvelope, got {other:?}"),
        }
    }

    #[test]
    fn required_fixed_field_is_enforced() {
        let err = codec()
            .decode_value(ITEM, json!({"properties": {"protectableItemType": "Sql", "friendlyName": "f", "instanceCount": 1}}))
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::MalformedEnvelope { field: Some(ref f), .. } if f == "id"
        ));

        let err = codec().decode_value(ITEM, json!({"id": "i", "tags": {"a": 1}})).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MalformedEnvelope { field: Some(ref f), .. } if f == "tags"
        ));
    }

    #[test]
    fn variant_payload_errors_carry_the_discriminator() {
        let err = codec()
            .decode_value(OUTPUT, json!({"properties": {"datasourceType": "EventHub", "partitionKey": "pk"}}))
            .unwrap_err();
        assert!(matches!(
            &err,
            CodecError::VariantDecode { kind, discriminator, .. }
                if kind == OUTPUT && discriminator == "EventHub"
        ));
        assert!(err.to_string().contains("eventHubName"));
    }

    #[test]
    fn unknown_kind_is_reported() {
        let err = codec().decode("function", b"{}").unwrap_err();
        assert!(matches!(err, CodecError::UnknownKind(k) if k == "function"));
    }

    #[test]
    fn preserved_unknown_fields_are_visible_on_the_slot() {
        let envelope = codec()
            .decode_value(
                OUTPUT,
                json!({"properties": {"datasourceType": "Sql", "server": "s1", "futureField": 1}}),
            )
            .unwrap();
        let slot = envelope.slot().unwrap();
        assert_eq!(slot.unknown_fields().fields().len(), 1);
        assert_eq!(slot.unknown_fields().fields()["futureField"], 1);
        assert_eq!(slot.unknown_fields().paths(), vec!["futureField"]);
    }

    #[test]
    fn drop_policy_discards_unknown_fields_explicitly() {
        let codec = CodecBuilder::new()
            .kind(output_kind().unknown_fields(UnknownFieldPolicy::Drop))
            .unwrap()
            .register::<SqlOutput>(OUTPUT)
            .unwrap()
            .build()
            .unwrap();

        let envelope = codec
            .decode_value(
                OUTPUT,
                json!({"properties": {"datasourceType": "Sql", "server": "s1", "futureField": 1}}),
            )
            .unwrap();
        assert!(envelope.slot().unwrap().unknown_fields().is_empty());
        assert_eq!(
            codec.encode_value(OUTPUT, &envelope).unwrap(),
            json!({"properties": {"datasourceType": "Sql", "server": "s1"}})
        );
    }

    /// discriminator を自分のフィールドとしても持つ variant
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SelfTaggedOutput {
        datasource_type: String,
        table: String,
    }

    impl Variant for SelfTaggedOutput {
        const DISCRIMINATOR: &'static str = "Table";
    }

    #[test]
    fn discriminator_duplicated_on_the_variant_is_tolerated() {
        let codec = CodecBuilder::new()
            .kind(output_kind())
            .unwrap()
            .register::<SelfTaggedOutput>(OUTPUT)
            .unwrap()
            .build()
            .unwrap();
        let input = json!({"properties": {"datasourceType": "Table", "table": "t"}});

        let envelope = codec.decode_value(OUTPUT, input.clone()).unwrap();
        assert_eq!(envelope.variant::<SelfTaggedOutput>().unwrap().datasource_type, "Table");
        assert_eq!(codec.encode_value(OUTPUT, &envelope).unwrap(), input);
    }

    #[test]
    fn encoder_that_rewrites_the_discriminator_is_rejected() {
        let codec = CodecBuilder::new()
            .kind(output_kind())
            .unwrap()
            .register::<SelfTaggedOutput>(OUTPUT)
            .unwrap()
            .build()
            .unwrap();
        let envelope = Envelope::new().with_slot(Slot::known(SelfTaggedOutput {
            datasource_type: "Blob".into(),
            table: "t".into(),
        }));

        let err = codec.encode_value(OUTPUT, &envelope).unwrap_err();
        assert!(matches!(
            err,
            CodecError::VariantEncode { ref discriminator, .. } if discriminator == "Table"
        ));
    }

    #[test]
    fn encoding_a_variant_of_another_kind_fails() {
        let envelope = Envelope::new().with_slot(Slot::known(SqlProtectableItem {
            friendly_name: "f".into(),
            instance_count: 1,
        }));
        let codec = CodecBuilder::new()
            .kind(item_kind())
            .unwrap()
            .kind(EnvelopeKind::new("empty"))
            .unwrap()
            .build()
            .unwrap();
        let err = codec.encode_value("empty", &envelope).unwrap_err();
        assert!(matches!(err, CodecError::VariantEncode { .. }));
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct BlobEndpoint {
        container_name: String,
    }

    impl Variant for BlobEndpoint {
        const DISCRIMINATOR: &'static str = "AzureStorageBlobContainer";
    }

    fn sibling_codec() -> Codec {
        CodecBuilder::new()
            .kind(
                EnvelopeKind::new("endpoint")
                    .fixed("kind", FieldType::String, Presence::Optional)
                    .discriminator(DiscriminatorSource::Sibling("kind".into()))
                    .require_slot(),
            )
            .unwrap()
            .register::<BlobEndpoint>("endpoint")
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn sibling_discriminator_round_trips() {
        let input = json!({"kind": "AzureStorageBlobContainer", "properties": {"containerName": "c"}});
        let codec = sibling_codec();
        let envelope = codec.decode_value("endpoint", input.clone()).unwrap();
        assert_eq!(envelope.variant::<BlobEndpoint>().unwrap().container_name, "c");
        assert_eq!(codec.encode_value("endpoint", &envelope).unwrap(), input);
    }

    #[test]
    fn sibling_discriminator_is_written_from_the_slot() {
        let envelope = Envelope::new().with_slot(Slot::known(BlobEndpoint {
            container_name: "c".into(),
        }));
        let encoded = sibling_codec().encode_value("endpoint", &envelope).unwrap();
        assert_eq!(encoded["kind"], "AzureStorageBlobContainer");
        assert!(encoded["properties"].get("kind").is_none());
    }

    #[test]
    fn required_slot_is_enforced_both_ways() {
        let codec = sibling_codec();
        let err = codec.decode_value("endpoint", json!({"kind": "x"})).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MalformedEnvelope { field: Some(ref f), .. } if f == "properties"
        ));

        let err = codec.encode_value("endpoint", &Envelope::new()).unwrap_err();
        assert!(matches!(err, CodecError::MalformedEnvelope { .. }));
    }

    #[test]
    fn fn_registered_variant_round_trips() {
        let codec = CodecBuilder::new()
            .kind(output_kind())
            .unwrap()
            .register_fn(
                OUTPUT,
                "Sql",
                Arc::new(|v: &Value| {
                    let sql = SqlOutput::deserialize(v)?;
                    Ok(Box::new(sql) as Box<dyn VariantValue>)
                }),
                Arc::new(|v: &dyn VariantValue| v.to_json()),
            )
            .unwrap()
            .build()
            .unwrap();

        let input = json!({"properties": {"datasourceType": "Sql", "database": "db1"}});
        let envelope = codec.decode_value(OUTPUT, input.clone()).unwrap();
        assert_eq!(envelope.variant::<SqlOutput>().unwrap().database.as_deref(), Some("db1"));
        assert_eq!(codec.encode_value(OUTPUT, &envelope).unwrap(), input);
    }

    #[test]
    fn shared_codec_decodes_from_many_threads() {
        let codec = Arc::new(codec());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let codec = Arc::clone(&codec);
                std::thread::spawn(move || {
                    let input = json!({
                        "id": i.to_string(),
                        "properties": {"datasourceType": "Sql", "server": format!("s{i}")}
                    });
                    let envelope = codec.decode_value(OUTPUT, input.clone()).unwrap();
                    assert_eq!(codec.encode_value(OUTPUT, &envelope).unwrap(), input);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
