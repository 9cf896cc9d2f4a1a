//! Error types for both codec directions.

use thiserror::Error;

/// Reason a decode failed.
///
/// Sink factories return a kind on their own failures; the decoder wraps
/// every kind into a [`DecodeError`] with the byte offset it surfaced at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    /// A byte that cannot start any JSON value.
    #[error("expected object or value")]
    ExpectedValue,
    /// A `true`/`false`/`null`/`NaN`/`Infinity`/`-Infinity` literal with a
    /// wrong letter.
    #[error("unexpected character found when decoding '{0}'")]
    BadLiteral(&'static str),
    /// A sign without digits, or a mantissa/exponent the float parser
    /// rejected.
    #[error("unexpected character found when decoding number")]
    BadNumber,
    #[error("unmatched '\"' when decoding string")]
    UnterminatedString,
    #[error("unterminated escape sequence when decoding string")]
    UnterminatedEscape,
    #[error("unrecognized escape sequence when decoding string")]
    UnrecognizedEscape,
    #[error("unexpected character in unicode escape sequence when decoding string")]
    BadUnicodeEscape,
    /// A continuation byte without the `10xxxxxx` shape.
    #[error("invalid octet in UTF-8 sequence when decoding string")]
    InvalidUtf8Octet,
    /// A lead byte announcing a sequence longer than four bytes.
    #[error("invalid UTF-8 sequence length when decoding string")]
    InvalidUtf8Length,
    /// A sequence whose decoded value fits a shorter encoding.
    #[error("overlong {0} byte UTF-8 sequence detected when decoding string")]
    OverlongUtf8(u8),
    #[error("reached object decoding depth limit")]
    DepthLimit,
    #[error("key name of object must be a string when decoding object")]
    KeyMustBeString,
    #[error("no ':' found when decoding object value")]
    MissingColon,
    #[error("unexpected character found when decoding array value")]
    BadArrayValue,
    #[error("unexpected character found when decoding object value")]
    BadObjectValue,
    /// Non-whitespace bytes after a complete top-level value.
    #[error("trailing data")]
    TrailingData,
    /// Failure reported by the sink itself.
    #[error("{0}")]
    Sink(String),
}

/// A decode failure and the byte offset it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub offset: usize,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Reason an encode failed.
///
/// The first error aborts the walk; output already produced stays a valid
/// prefix but the document is never completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("maximum recursion level reached")]
    RecursionLimit,
    /// The source classified a value as [`Invalid`](crate::TypeTag::Invalid).
    #[error("invalid type")]
    InvalidType,
    /// The source returned no bytes for a string or raw value.
    #[error("string value was not available")]
    StringFetch,
    /// Input ended inside a multi-byte UTF-8 sequence.
    #[error("unterminated UTF-8 sequence when encoding string")]
    TruncatedUtf8,
    /// A continuation byte without the `10xxxxxx` shape.
    #[error("invalid octet in UTF-8 sequence when encoding string")]
    InvalidUtf8Octet,
    /// A lead byte announcing a sequence longer than four bytes.
    #[error("unsupported UTF-8 sequence length when encoding string")]
    InvalidUtf8Length,
    /// A sequence whose decoded value fits a shorter encoding.
    #[error("overlong {0} byte UTF-8 sequence detected when encoding string")]
    OverlongUtf8(u8),
    /// A non-finite double with `allow_nan` disabled.
    #[error("non-finite double value is not allowed")]
    NonFiniteDouble,
}
