//! Models - リモート API の variant 群
//!
//! 各モジュールは envelope kind の宣言と `register()` を持つ。
//! `catalog` で全部まとめて 1 つの Codec にする。

pub mod stream_analytics;
pub mod storage_mover;
pub mod container_registry;
pub mod recovery_services;
pub mod digital_twins;
pub mod catalog;
