//! `JsonSource` — the introspection surface the encoder drives.

use crate::encoder::EncodeOptions;
use crate::types::TypeTag;

/// Walks an opaque host value graph on behalf of the encoder.
///
/// `Value` is a cheap handle, typically a shared reference. `Context` is the
/// per-value scratch [`begin`](JsonSource::begin) creates: container
/// iteration state lives there, as does any temporary text the source must
/// keep alive while the encoder borrows it (a transcoded key, the decimal
/// form of an oversized integer).
///
/// Call order per value: `begin`, then the getters the returned tag selects,
/// then [`end`](JsonSource::end). For containers the encoder brackets the
/// item loop with [`iter_begin`](JsonSource::iter_begin) and
/// [`iter_end`](JsonSource::iter_end); `iter_end` runs even when an item
/// fails, so iteration state never leaks.
pub trait JsonSource {
    type Value;
    type Context;

    /// Classifies `value` and builds its context. Called once per value.
    ///
    /// Returning [`TypeTag::Invalid`] aborts the encode. In that case the
    /// context is dropped without `end` being called, so `begin` must leave
    /// nothing behind that only `end` would clean up.
    fn begin(&mut self, value: &Self::Value, opts: &EncodeOptions) -> (TypeTag, Self::Context);

    /// Closes the context opened by `begin`. Runs for every tag except
    /// `Invalid`, on success and error paths alike.
    fn end(&mut self, value: &Self::Value, ctx: Self::Context);

    /// Bytes of a `Utf8String` value, or the verbatim bytes of a `Raw`
    /// value. `None` aborts the encode.
    fn string_value<'c>(
        &mut self,
        value: &Self::Value,
        ctx: &'c mut Self::Context,
    ) -> Option<&'c [u8]>;

    /// The number behind `Int32` and `Int64` tags.
    fn long_value(&mut self, value: &Self::Value, ctx: &mut Self::Context) -> i64;

    /// The number behind the `UInt64` tag.
    fn unsigned_long_value(&mut self, value: &Self::Value, ctx: &mut Self::Context) -> u64;

    /// The number behind the `Double` tag.
    fn double_value(&mut self, value: &Self::Value, ctx: &mut Self::Context) -> f64;

    /// Prepares iteration over an `Array` or `Object` value.
    fn iter_begin(&mut self, value: &Self::Value, ctx: &mut Self::Context);

    /// Advances to the next item. `false` ends the container.
    fn iter_next(&mut self, value: &Self::Value, ctx: &mut Self::Context) -> bool;

    /// Ends iteration. Runs exactly once per `iter_begin`.
    fn iter_end(&mut self, value: &Self::Value, ctx: &mut Self::Context);

    /// Handle of the item `iter_next` moved onto.
    fn iter_value(&mut self, value: &Self::Value, ctx: &mut Self::Context) -> Self::Value;

    /// Key bytes of the item `iter_next` moved onto (objects only). `None`
    /// aborts the encode.
    fn iter_name<'c>(
        &mut self,
        value: &Self::Value,
        ctx: &'c mut Self::Context,
    ) -> Option<&'c [u8]>;
}
