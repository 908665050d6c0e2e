//! Catalog - 同梱の全 model family を登録した Codec

use crate::app::{BuildError, Codec, CodecBuilder};

use super::{container_registry, digital_twins, recovery_services, storage_mover, stream_analytics};

/// 同梱の全 family を登録した CodecBuilder
///
/// 呼び出し側で独自の kind / variant を追加してから `build()` できる。
pub fn builder() -> Result<CodecBuilder, BuildError> {
    let builder = CodecBuilder::new();
    let builder = stream_analytics::register(builder)?;
    let builder = storage_mover::register(builder)?;
    let builder = container_registry::register(builder)?;
    let builder = recovery_services::register(builder)?;
    digital_twins::register(builder)
}

/// 同梱の全 family を登録した Codec
pub fn codec() -> Result<Codec, BuildError> {
    builder()?.build()
}
