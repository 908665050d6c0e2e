//! CodecBuilder - Codec の構築と variant の登録
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 構築後は不変（実行中に registry を書き換えない）

use std::collections::HashMap;

use crate::app::codec::{Codec, KindEntry};
use crate::domain::EnvelopeKind;
use crate::typed::{DecodeFn, EncodeFn, RegistryError, Variant, VariantDescriptor, VariantRegistry};
use std::sync::Arc;

/// CodecBuilder は起動時に envelope kind と variant を登録する
///
/// # 使用例
/// ```ignore
/// let codec = CodecBuilder::new()
///     .kind(EnvelopeKind::new("stream_analytics.output"))?
///     .register::<EventHubOutput>("stream_analytics.output")?
///     .expect_variants("stream_analytics.output", &["Microsoft.ServiceBus/EventHub"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_variants() で期待される discriminator を宣言
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば BuildError を返す
#[derive(Default)]
pub struct CodecBuilder {
    kinds: HashMap<String, KindEntry>,
    expected: Vec<(String, Vec<String>)>,
}

/// BuildError は Codec 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("envelope kind `{0}` is already declared")]
    DuplicateKind(String),

    #[error("envelope kind `{0}` must be declared before registering variants")]
    UndeclaredKind(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("missing variants for `{kind}`: {missing:?}. These variants were expected but not registered.")]
    MissingVariants { kind: String, missing: Vec<String> },
}

impl CodecBuilder {
    /// 新しい CodecBuilder を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// envelope kind を宣言
    pub fn kind(mut self, kind: EnvelopeKind) -> Result<Self, BuildError> {
        let name = kind.name().to_string();
        if self.kinds.contains_key(&name) {
            return Err(BuildError::DuplicateKind(name));
        }
        tracing::debug!(kind = %name, slot = kind.slot_field(), "declared envelope kind");
        let registry = VariantRegistry::new(name.clone());
        self.kinds.insert(name, KindEntry { kind, registry });
        Ok(self)
    }

    /// `Variant` 型を kind に登録
    pub fn register<V: Variant>(mut self, kind: &str) -> Result<Self, BuildError> {
        self.registry_mut(kind)?.register::<V>()?;
        Ok(self)
    }

    /// decode / encode 関数を kind に登録
    ///
    /// `Variant` を実装しない表現（手書きの変換など）を登録したいとき用。
    pub fn register_fn(
        mut self,
        kind: &str,
        discriminator: impl Into<String>,
        decode: DecodeFn,
        encode: EncodeFn,
    ) -> Result<Self, BuildError> {
        self.registry_mut(kind)?
            .register_fn(discriminator, decode, encode)?;
        Ok(self)
    }

    pub fn register_descriptor(
        mut self,
        kind: &str,
        descriptor: Arc<dyn VariantDescriptor>,
    ) -> Result<Self, BuildError> {
        self.registry_mut(kind)?.register_descriptor(descriptor)?;
        Ok(self)
    }

    /// kind に対して期待される discriminator のリストを追加
    pub fn expect_variants(mut self, kind: &str, discriminators: &[&str]) -> Self {
        let expected = discriminators.iter().map(|d| d.to_string()).collect();
        self.expected.push((kind.to_string(), expected));
        self
    }

    /// CodecBuilder を構築して Codec を生成
    ///
    /// # 検証
    /// - expect_variants() の kind が宣言されているか
    /// - 期待された discriminator が全て登録されているか
    pub fn build(self) -> Result<Codec, BuildError> {
        for (kind, expected) in &self.expected {
            let entry = self
                .kinds
                .get(kind)
                .ok_or_else(|| BuildError::UndeclaredKind(kind.clone()))?;
            let missing: Vec<String> = expected
                .iter()
                .filter(|d| !entry.registry.contains(d))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingVariants {
                    kind: kind.clone(),
                    missing,
                });
            }
        }

        for entry in self.kinds.values() {
            tracing::info!(
                kind = entry.kind.name(),
                variants = entry.registry.len(),
                passthrough = entry.kind.allows_passthrough(),
                "envelope kind ready"
            );
        }
        Ok(Codec::new(self.kinds))
    }

    fn registry_mut(&mut self, kind: &str) -> Result<&mut VariantRegistry, BuildError> {
        self.kinds
            .get_mut(kind)
            .map(|e| &mut e.registry)
            .ok_or_else(|| BuildError::UndeclaredKind(kind.to_string()))
    }
}
