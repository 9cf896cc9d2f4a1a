//! `JsonSink` — the constructor surface the decoder drives.

use crate::error::DecodeErrorKind;

/// Builds host values from decoded JSON pieces.
///
/// The decoder is a pure scanner: every piece it recognizes goes through a
/// factory here and the result is treated as an opaque handle. Factories are
/// fallible so a host can refuse a value (out-of-range integer, failed
/// allocation); the returned kind aborts the decode and is reported with the
/// byte offset the decoder was at.
///
/// On an error path the decoder calls [`release`](JsonSink::release) exactly
/// once for every container handle still under construction, and for an
/// object key produced but not yet attached. Sinks that track ownership or
/// reference counts dispose of partial results there; for plain owned values
/// the default body (drop) is enough.
pub trait JsonSink {
    /// Handle to a constructed host value.
    type Value;

    /// A decoded string as 32-bit code units. A combined surrogate pair
    /// arrives as one supplementary code point; unpaired surrogates pass
    /// through as-is and are the sink's to resolve.
    fn new_string(&mut self, units: &[u32]) -> Result<Self::Value, DecodeErrorKind>;

    /// An integer that fits in 32 bits.
    fn new_int(&mut self, value: i32) -> Result<Self::Value, DecodeErrorKind>;

    /// An integer that fits in 64 bits.
    fn new_long(&mut self, value: i64) -> Result<Self::Value, DecodeErrorKind>;

    /// A positive integer above `i64::MAX`.
    fn new_unsigned_long(&mut self, value: u64) -> Result<Self::Value, DecodeErrorKind>;

    /// An integer too wide for 64 bits, handed over as its decimal text
    /// (sign included).
    fn new_integer_from_string(&mut self, text: &str) -> Result<Self::Value, DecodeErrorKind>;

    fn new_double(&mut self, value: f64) -> Result<Self::Value, DecodeErrorKind>;

    fn new_true(&mut self) -> Result<Self::Value, DecodeErrorKind>;

    fn new_false(&mut self) -> Result<Self::Value, DecodeErrorKind>;

    fn new_null(&mut self) -> Result<Self::Value, DecodeErrorKind>;

    /// The `NaN` extension literal.
    fn new_nan(&mut self) -> Result<Self::Value, DecodeErrorKind>;

    /// The `Infinity` extension literal.
    fn new_pos_inf(&mut self) -> Result<Self::Value, DecodeErrorKind>;

    /// The `-Infinity` extension literal.
    fn new_neg_inf(&mut self) -> Result<Self::Value, DecodeErrorKind>;

    fn new_array(&mut self) -> Result<Self::Value, DecodeErrorKind>;

    fn new_object(&mut self) -> Result<Self::Value, DecodeErrorKind>;

    /// Appends a decoded item to an array under construction.
    fn array_add_item(&mut self, array: &mut Self::Value, item: Self::Value);

    /// Attaches a key/value pair to an object under construction. The key
    /// was produced by [`new_string`](JsonSink::new_string).
    fn object_add_key(&mut self, object: &mut Self::Value, key: Self::Value, value: Self::Value);

    /// Disposes a handle abandoned on an error path.
    fn release(&mut self, value: Self::Value) {
        let _ = value;
    }
}
