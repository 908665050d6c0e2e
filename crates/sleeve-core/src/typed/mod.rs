//! Typed - 型付き Variant API
//!
//! discriminator 文字列の typo を型で排除し、
//! decode / encode ロジックとの対応付けを静的に保証します。
//!
//! # 二層構造
//! - **表層（Typed）**: `Variant` trait - 型安全
//! - **内部（Dyn）**: `VariantDescriptor` / `VariantValue` trait - object-safe, type erasure

pub mod variant;
pub mod descriptor;
pub mod registry;

// 主要な trait/型 を再エクスポート
pub use self::variant::{Variant, VariantValue};
pub use self::descriptor::{DecodeFn, EncodeFn, FnDescriptor, TypedDescriptor, VariantDescriptor};
pub use self::registry::{RegistryError, VariantRegistry};
