//! sleeve-core
//!
//! 判別子付きの多相フィールド（polymorphic slot）を 1 つ持つ JSON envelope を
//! 型付きで decode / encode するための building blocks。
//!
//! # モジュール構成
//! - **domain**: Envelope / Slot / EnvelopeKind と CodecError
//! - **typed**: 型付き Variant API（Variant trait, VariantDescriptor, VariantRegistry）
//! - **app**: CodecBuilder と、組み立て後に不変になる Codec
//! - **models**: 同梱している envelope kind と variant の定義
//! - **resources**: Envelope とフラットな設定モデルの相互変換
//!
//! # 使い方
//! ```ignore
//! let codec = sleeve_core::models::catalog::codec()?;
//! let envelope = codec.decode("stream_analytics.output", body)?;
//! let bytes = codec.encode("stream_analytics.output", &envelope)?;
//! ```

pub mod app;
pub mod domain;
pub mod models;
pub mod resources;
pub mod typed;

pub use app::{BuildError, Codec, CodecBuilder};
pub use domain::{CodecError, Envelope, EnvelopeKind, Slot, SlotValue};
pub use typed::{RegistryError, Variant, VariantRegistry};
