//! `TypeTag` — the type vocabulary shared by both codec directions.

/// How the codec classifies a value.
///
/// The decoder tracks the tag of the value it just produced (object keys
/// must come out as [`Utf8String`](TypeTag::Utf8String)); encode sources
/// return one from [`begin`](crate::JsonSource::begin) to tell the
/// serializer which getter family applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// JSON `null`.
    Null,
    /// JSON `true`.
    True,
    /// JSON `false`.
    False,
    /// Integer that fits in 32 bits, fetched with `long_value`.
    Int32,
    /// Integer that fits in 64 bits, fetched with `long_value`.
    Int64,
    /// Positive integer above `i64::MAX`, fetched with `unsigned_long_value`.
    UInt64,
    /// IEEE double, fetched with `double_value`.
    Double,
    /// UTF-8 text, fetched with `string_value`.
    Utf8String,
    /// Bytes already in JSON syntax, fetched with `string_value` and copied
    /// verbatim.
    Raw,
    /// Container iterated with the `iter_*` family, items unnamed.
    Array,
    /// Container iterated with the `iter_*` family, items named.
    Object,
    /// Sentinel: the source cannot represent this value, stop with an error.
    Invalid,
    /// The `NaN` extension literal.
    Nan,
    /// The `Infinity` extension literal.
    PosInf,
    /// The `-Infinity` extension literal.
    NegInf,
}
