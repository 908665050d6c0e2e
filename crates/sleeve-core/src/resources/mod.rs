//! resources - 設定モデルとの相互変換
//!
//! Envelope（wire の形）とフラットな設定（利用者が書く形）を行き来する。
//! codec 本体はこの層を知らない。

pub mod stream_analytics_output;

pub use stream_analytics_output::{EventHubOutputConfig, SqlOutputConfig};

use thiserror::Error;

/// 設定から Envelope を組み立てるときのエラー
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}
