//! Envelope - 固定フィールド + polymorphic slot 1 つ
//!
//! Envelope は受信した JSON から作られ、CRUD 1 回分だけ使われて捨てられる。
//! 固定フィールドは wire 上の値をそのまま（順序も含めて）保持する。
//! 「フィールドが無い」と「空文字」は区別される（`str_field` が `None` / `Some("")`）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::unknown::UnknownFields;
use crate::typed::{Variant, VariantValue};

/// Envelope は decode 済みの 1 ドキュメント
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Envelope {
    fields: Map<String, Value>,
    slot: Option<Slot>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(fields: Map<String, Value>, slot: Option<Slot>) -> Self {
        Self { fields, slot }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn set_slot(&mut self, slot: Option<Slot>) {
        self.slot = slot;
    }

    /// slot 以外のトップレベルフィールド（wire 上の順序）
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// 文字列フィールド。無い / null / 文字列以外は `None`
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// トップレベルの `type`（ARM のリソース型）
    pub fn resource_type(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn system_data(&self) -> Result<Option<SystemData>, serde_json::Error> {
        match self.fields.get("systemData") {
            None | Some(Value::Null) => Ok(None),
            Some(v) => SystemData::deserialize(v).map(Some),
        }
    }

    pub fn slot(&self) -> Option<&Slot> {
        self.slot.as_ref()
    }

    pub fn take_slot(&mut self) -> Option<Slot> {
        self.slot.take()
    }

    /// slot が `V` ならその参照
    pub fn variant<V: Variant>(&self) -> Option<&V> {
        self.slot.as_ref().and_then(Slot::downcast_ref::<V>)
    }
}

/// Slot は discriminator でタグ付けされた polymorphic な値
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    discriminator: String,
    value: SlotValue,
    unknown_fields: UnknownFields,
}

/// slot の中身
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    /// 登録済み variant で decode された値
    Known(Box<dyn VariantValue>),
    /// passthrough: 受信したサブツリーそのもの
    Opaque(Value),
}

impl Slot {
    /// `V::DISCRIMINATOR` でタグ付けした slot
    pub fn known<V: Variant>(value: V) -> Self {
        Self::from_boxed(V::DISCRIMINATOR, Box::new(value))
    }

    pub fn from_boxed(discriminator: impl Into<String>, value: Box<dyn VariantValue>) -> Self {
        Self {
            discriminator: discriminator.into(),
            value: SlotValue::Known(value),
            unknown_fields: UnknownFields::default(),
        }
    }

    /// 未登録 discriminator の生データ
    pub fn opaque(discriminator: impl Into<String>, raw: Value) -> Self {
        Self {
            discriminator: discriminator.into(),
            value: SlotValue::Opaque(raw),
            unknown_fields: UnknownFields::default(),
        }
    }

    pub(crate) fn with_unknown_fields(mut self, unknown_fields: UnknownFields) -> Self {
        self.unknown_fields = unknown_fields;
        self
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    pub fn value(&self) -> &SlotValue {
        &self.value
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.value, SlotValue::Opaque(_))
    }

    pub fn downcast_ref<V: Variant>(&self) -> Option<&V> {
        match &self.value {
            SlotValue::Known(v) => v.as_any().downcast_ref::<V>(),
            SlotValue::Opaque(_) => None,
        }
    }

    /// variant の struct が知らなかった slot 内フィールド（ネストしたものを含む）
    pub fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown_fields
    }
}

/// ARM の `systemData`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
}
