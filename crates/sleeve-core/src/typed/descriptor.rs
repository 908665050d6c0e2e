//! VariantDescriptor - discriminator 1 つ分の decode / encode ロジック
//!
//! # 学習ポイント
//! - Object-safe trait (VariantDescriptor)
//! - Type erasure パターン (TypedDescriptor<T> → dyn VariantDescriptor)
//! - クロージャによる登録 (FnDescriptor)

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::variant::{Variant, VariantValue};

/// slot のサブツリーから variant を組み立てる関数
pub type DecodeFn =
    Arc<dyn Fn(&Value) -> Result<Box<dyn VariantValue>, serde_json::Error> + Send + Sync>;

/// variant を wire 形式のオブジェクトに戻す関数
pub type EncodeFn =
    Arc<dyn Fn(&dyn VariantValue) -> Result<Value, serde_json::Error> + Send + Sync>;

/// VariantDescriptor は registry に格納される object-safe な descriptor
///
/// # Object Safety
/// - メソッドはジェネリックではない
/// - `HashMap<String, Arc<dyn VariantDescriptor>>` に格納できる
pub trait VariantDescriptor: Send + Sync {
    fn discriminator(&self) -> &str;

    fn decode(&self, subtree: &Value) -> Result<Box<dyn VariantValue>, serde_json::Error>;

    fn encode(&self, value: &dyn VariantValue) -> Result<Value, serde_json::Error>;
}

/// `Variant` 型から作る descriptor（serde にそのまま委譲）
pub struct TypedDescriptor<T: Variant> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Variant> TypedDescriptor<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Variant> Default for TypedDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Variant> VariantDescriptor for TypedDescriptor<T> {
    fn discriminator(&self) -> &str {
        T::DISCRIMINATOR
    }

    fn decode(&self, subtree: &Value) -> Result<Box<dyn VariantValue>, serde_json::Error> {
        let value = T::deserialize(subtree)?;
        Ok(Box::new(value))
    }

    fn encode(&self, value: &dyn VariantValue) -> Result<Value, serde_json::Error> {
        value.to_json()
    }
}

/// 任意の decode / encode 関数から作る descriptor
pub struct FnDescriptor {
    discriminator: String,
    decode: DecodeFn,
    encode: EncodeFn,
}

impl FnDescriptor {
    pub fn new(discriminator: impl Into<String>, decode: DecodeFn, encode: EncodeFn) -> Self {
        Self {
            discriminator: discriminator.into(),
            decode,
            encode,
        }
    }
}

impl VariantDescriptor for FnDescriptor {
    fn discriminator(&self) -> &str {
        &self.discriminator
    }

    fn decode(&self, subtree: &Value) -> Result<Box<dyn VariantValue>, serde_json::Error> {
        (self.decode)(subtree)
    }

    fn encode(&self, value: &dyn VariantValue) -> Result<Value, serde_json::Error> {
        (self.encode)(value)
    }
}
