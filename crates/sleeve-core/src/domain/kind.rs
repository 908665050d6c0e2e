//! EnvelopeKind - Envelope の「形」の宣言
//!
//! Envelope kind ごとに以下を宣言します:
//! - 固定フィールド（名前・型・必須/任意）
//! - polymorphic slot のフィールド名
//! - discriminator の位置（slot の内側 / slot の隣）
//! - 未知フィールドの扱い（保持 / 破棄）
//! - 未登録 discriminator の fallback（passthrough）の有無

use serde_json::Value;

/// 固定フィールドの JSON 上の型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Bool,
    Number,
    Object,
    /// 値が全て文字列のオブジェクト（例: `tags`）
    StringMap,
    StringArray,
    /// 型チェックしない
    Any,
}

impl FieldType {
    /// `value` がこの型に合致するか
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Number => value.is_number(),
            FieldType::Object => value.is_object(),
            FieldType::StringMap => value
                .as_object()
                .is_some_and(|m| m.values().all(Value::is_string)),
            FieldType::StringArray => value
                .as_array()
                .is_some_and(|a| a.iter().all(Value::is_string)),
            FieldType::Any => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Bool => "bool",
            FieldType::Number => "number",
            FieldType::Object => "object",
            FieldType::StringMap => "map<string, string>",
            FieldType::StringArray => "array<string>",
            FieldType::Any => "any",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// 宣言された固定フィールド
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedField {
    pub name: String,
    pub field_type: FieldType,
    pub presence: Presence,
}

/// discriminator をどこから読むか
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscriminatorSource {
    /// slot オブジェクト内のフィールド（例: `properties.datasourceType`）
    Inner(String),
    /// slot と同じ階層の固定フィールド（例: `kind`）
    Sibling(String),
}

impl DiscriminatorSource {
    pub fn field(&self) -> &str {
        match self {
            DiscriminatorSource::Inner(f) | DiscriminatorSource::Sibling(f) => f,
        }
    }
}

/// variant の struct が知らない slot 内フィールドの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFieldPolicy {
    /// Slot に保持して encode 時に書き戻す
    #[default]
    Preserve,
    /// 破棄する（明示的なロス）
    Drop,
}

/// EnvelopeKind は 1 種類の Envelope の宣言
///
/// # 使用例
/// ```ignore
/// let kind = EnvelopeKind::new("stream_analytics.output")
///     .fixed("id", FieldType::String, Presence::Optional)
///     .fixed("name", FieldType::String, Presence::Optional)
///     .slot("properties")
///     .discriminator(DiscriminatorSource::Inner("datasourceType".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeKind {
    name: String,
    fixed_fields: Vec<FixedField>,
    slot_field: String,
    slot_required: bool,
    discriminator: DiscriminatorSource,
    unknown_fields: UnknownFieldPolicy,
    passthrough: bool,
}

impl EnvelopeKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixed_fields: Vec::new(),
            slot_field: "properties".to_string(),
            slot_required: false,
            discriminator: DiscriminatorSource::Inner("type".to_string()),
            unknown_fields: UnknownFieldPolicy::default(),
            passthrough: false,
        }
    }

    pub fn fixed(mut self, name: impl Into<String>, field_type: FieldType, presence: Presence) -> Self {
        self.fixed_fields.push(FixedField {
            name: name.into(),
            field_type,
            presence,
        });
        self
    }

    pub fn slot(mut self, field: impl Into<String>) -> Self {
        self.slot_field = field.into();
        self
    }

    pub fn require_slot(mut self) -> Self {
        self.slot_required = true;
        self
    }

    pub fn discriminator(mut self, source: DiscriminatorSource) -> Self {
        self.discriminator = source;
        self
    }

    pub fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// 未登録 discriminator を opaque な値として通す
    pub fn passthrough(mut self) -> Self {
        self.passthrough = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fixed_fields(&self) -> &[FixedField] {
        &self.fixed_fields
    }

    pub fn fixed_field(&self, name: &str) -> Option<&FixedField> {
        self.fixed_fields.iter().find(|f| f.name == name)
    }

    pub fn slot_field(&self) -> &str {
        &self.slot_field
    }

    pub fn slot_required(&self) -> bool {
        self.slot_required
    }

    pub fn discriminator_source(&self) -> &DiscriminatorSource {
        &self.discriminator
    }

    pub fn unknown_field_policy(&self) -> UnknownFieldPolicy {
        self.unknown_fields
    }

    pub fn allows_passthrough(&self) -> bool {
        self.passthrough
    }
}
