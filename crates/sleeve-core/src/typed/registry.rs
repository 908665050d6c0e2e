//! VariantRegistry - envelope kind 1 つ分の discriminator → descriptor 対応表
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - Generic methods での登録と型安全性
//! - Arc による共有所有権
//!
//! registry は envelope kind ごとに 1 つ。別の kind が同じ discriminator
//! 文字列（例: "Sql"）を使っても衝突しない。

use std::collections::HashMap;
use std::sync::Arc;

use super::descriptor::{DecodeFn, EncodeFn, FnDescriptor, TypedDescriptor, VariantDescriptor};
use super::variant::Variant;

/// VariantRegistry は descriptor を登録・管理
///
/// # 使用例
/// ```ignore
/// let mut registry = VariantRegistry::new("stream_analytics.output");
/// registry.register::<EventHubOutput>()?;
///
/// let descriptor = registry.get("Microsoft.ServiceBus/EventHub");
/// ```
///
/// 起動時に組み立て、`Codec` に渡した後は変更しない。
pub struct VariantRegistry {
    kind: String,
    descriptors: HashMap<String, Arc<dyn VariantDescriptor>>,
}

/// RegistryError は VariantRegistry の操作エラー
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("variant '{discriminator}' is already registered for envelope kind `{kind}`")]
    AlreadyRegistered { kind: String, discriminator: String },
}

impl VariantRegistry {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            descriptors: HashMap::new(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// `Variant` 型を登録（discriminator は `V::DISCRIMINATOR`）
    pub fn register<V: Variant>(&mut self) -> Result<(), RegistryError> {
        self.register_descriptor(Arc::new(TypedDescriptor::<V>::new()))
    }

    /// decode / encode 関数を直接登録
    pub fn register_fn(
        &mut self,
        discriminator: impl Into<String>,
        decode: DecodeFn,
        encode: EncodeFn,
    ) -> Result<(), RegistryError> {
        self.register_descriptor(Arc::new(FnDescriptor::new(discriminator, decode, encode)))
    }

    pub fn register_descriptor(
        &mut self,
        descriptor: Arc<dyn VariantDescriptor>,
    ) -> Result<(), RegistryError> {
        let discriminator = descriptor.discriminator().to_string();
        if self.descriptors.contains_key(&discriminator) {
            return Err(RegistryError::AlreadyRegistered {
                kind: self.kind.clone(),
                discriminator,
            });
        }
        tracing::debug!(kind = %self.kind, discriminator = %discriminator, "registered variant");
        self.descriptors.insert(discriminator, descriptor);
        Ok(())
    }

    pub fn get(&self, discriminator: &str) -> Option<&Arc<dyn VariantDescriptor>> {
        self.descriptors.get(discriminator)
    }

    pub fn contains(&self, discriminator: &str) -> bool {
        self.descriptors.contains_key(discriminator)
    }

    /// 登録済み discriminator（ソート済み）
    pub fn discriminators(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.descriptors.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
