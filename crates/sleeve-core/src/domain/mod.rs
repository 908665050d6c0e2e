//! Domain model (envelope kinds, envelopes, unknown-field trees, errors).

pub mod kind;
pub mod envelope;
pub mod errors;
pub mod unknown;

pub use self::kind::{
    DiscriminatorSource, EnvelopeKind, FieldType, FixedField, Presence, UnknownFieldPolicy,
};
pub use self::envelope::{Envelope, Slot, SlotValue, SystemData};
pub use self::errors::CodecError;
pub use self::unknown::{NestedUnknown, UnknownFields};
