//! JSON codec over host-defined value models.
//!
//! The decoder is a single-pass scanner that builds values through a
//! [`JsonSink`]; the encoder walks opaque handles through a [`JsonSource`].
//! Neither side commits to a value representation of its own — [`value`]
//! ships an owned-tree binding for callers that just want documents in and
//! bytes out.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod sink;
pub mod source;
pub mod types;
pub mod value;

pub use decoder::{DecodeOptions, JsonDecoder};
pub use encoder::{EncodeOptions, JsonEncoder};
pub use error::{DecodeError, DecodeErrorKind, EncodeError};
pub use sink::JsonSink;
pub use source::JsonSource;
pub use types::TypeTag;
pub use value::{
    decode_value, encode_value, encode_value_with, JsonValue, ValueBuilder, ValueContext,
    ValueSource,
};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
