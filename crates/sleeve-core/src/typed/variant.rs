//! Variant trait - discriminator と型の対応付け
//!
//! # 二層構造
//! - **表層（Typed）**: `Variant` trait - `const DISCRIMINATOR` で型と文字列を静的に結ぶ
//! - **内部（Dyn）**: `VariantValue` trait - object-safe, Slot に型消去して格納する

use std::any::Any;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Variant は discriminator と具体的な形を対応付ける
///
/// # 使用例
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct SqlOutput {
///     server: Option<String>,
///     database: Option<String>,
/// }
///
/// impl Variant for SqlOutput {
///     const DISCRIMINATOR: &'static str = "Sql";
/// }
/// ```
///
/// # Trait Bounds
/// - `Serialize` / `DeserializeOwned`: wire 形式との相互変換
/// - `PartialEq + Clone + Debug`: Envelope の比較・複製のため
/// - `Send + Sync + 'static`: 共有 Codec から複数スレッドで使うため
pub trait Variant:
    Serialize + DeserializeOwned + PartialEq + Clone + fmt::Debug + Send + Sync + 'static
{
    /// wire 上の discriminator の値（リモート API と完全一致）
    const DISCRIMINATOR: &'static str;
}

/// VariantValue は decode 済み variant の object-safe な表現
///
/// `Variant` を実装した型には blanket impl で自動的に実装されます。
/// descriptor を手書きする場合は独自の型に直接実装しても構いません。
pub trait VariantValue: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// wire 形式へ戻す（discriminator の付与は codec が行う）
    fn to_json(&self) -> Result<Value, serde_json::Error>;

    fn clone_boxed(&self) -> Box<dyn VariantValue>;

    fn eq_dyn(&self, other: &dyn VariantValue) -> bool;
}

impl<T: Variant> VariantValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn clone_boxed(&self) -> Box<dyn VariantValue> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn VariantValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

impl Clone for Box<dyn VariantValue> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl PartialEq for dyn VariantValue {
    fn eq(&self, other: &Self) -> bool {
        self.eq_dyn(other)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! テスト用の variant 群（複数モジュールのテストで共有）

    use super::Variant;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SqlOutput {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub server: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub database: Option<String>,
    }

    impl Variant for SqlOutput {
        const DISCRIMINATOR: &'static str = "Sql";
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EventHubOutput {
        pub event_hub_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub partition_key: Option<String>,
    }

    impl Variant for EventHubOutput {
        const DISCRIMINATOR: &'static str = "EventHub";
    }

    /// 別の envelope kind で同じ "Sql" を使う無関係な形
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SqlProtectableItem {
        pub friendly_name: String,
        pub instance_count: u32,
    }

    impl Variant for SqlProtectableItem {
        const DISCRIMINATOR: &'static str = "Sql";
    }
}
