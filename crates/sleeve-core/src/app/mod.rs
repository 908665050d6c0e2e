//! App - アプリケーション層
//!
//! registry 群を組み合わせて decode / encode を提供します。
//!
//! # 主要コンポーネント
//! - **CodecBuilder**: 起動時の envelope kind / variant 登録と検証
//! - **Codec**: 不変の decode / encode エンジン

pub mod builder;
pub mod codec;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, CodecBuilder};
pub use self::codec::Codec;
