//! Errors - codec のエラー分類
//!
//! どのエラーもリトライしても結果は変わらない（入力そのものの問題）。
//! エラーは呼び出し元にそのまま返し、codec 内でログ出力や握りつぶしはしない。

/// CodecError は decode / encode の失敗
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON として壊れている、固定フィールドの欠落・型違い、discriminator を決められない
    #[error("malformed `{kind}` envelope{}: {reason}", field_suffix(.field))]
    MalformedEnvelope {
        kind: String,
        field: Option<String>,
        reason: String,
    },

    /// codec に登録されていない envelope kind
    #[error("envelope kind `{0}` is not registered")]
    UnknownKind(String),

    /// discriminator が registry に無く、passthrough も無効
    #[error("unknown variant '{discriminator}' in field `{field}` of `{kind}` envelope")]
    UnknownVariant {
        kind: String,
        field: String,
        discriminator: String,
    },

    /// discriminator は一致したが、variant 固有の payload が壊れている
    #[error("decoding variant '{discriminator}' of `{kind}` envelope: {source}")]
    VariantDecode {
        kind: String,
        discriminator: String,
        #[source]
        source: serde_json::Error,
    },

    /// variant の encoder が不正な形を返した
    #[error("encoding variant '{discriminator}' of `{kind}` envelope: {reason}")]
    VariantEncode {
        kind: String,
        discriminator: String,
        reason: String,
    },
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(f) => format!(" (field `{f}`)"),
        None => String::new(),
    }
}

impl CodecError {
    pub(crate) fn malformed(kind: &str, field: Option<&str>, reason: impl Into<String>) -> Self {
        CodecError::MalformedEnvelope {
            kind: kind.to_string(),
            field: field.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// 常に false（入力を変えない限り同じ結果になる）
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// 呼び出し側が「スキップ」扱いにできるエラーか
    pub fn is_unknown_variant(&self) -> bool {
        matches!(self, CodecError::UnknownVariant { .. })
    }

    /// エラーに関係する envelope kind
    pub fn kind(&self) -> &str {
        match self {
            CodecError::MalformedEnvelope { kind, .. }
            | CodecError::UnknownVariant { kind, .. }
            | CodecError::VariantDecode { kind, .. }
            | CodecError::VariantEncode { kind, .. } => kind,
            CodecError::UnknownKind(kind) => kind,
        }
    }

    /// エラーに関係する discriminator（分かっている場合）
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            CodecError::UnknownVariant { discriminator, .. }
            | CodecError::VariantDecode { discriminator, .. }
            | CodecError::VariantEncode { discriminator, .. } => Some(discriminator),
            _ => None,
        }
    }
}
