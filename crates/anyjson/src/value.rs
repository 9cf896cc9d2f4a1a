//! `JsonValue` — owned tree binding for the codec traits.
//!
//! The decoder and encoder only speak [`JsonSink`] and [`JsonSource`];
//! this module is the batteries-included pair of implementations plus the
//! one-call helpers built on them.

use crate::decoder::JsonDecoder;
use crate::encoder::{EncodeOptions, JsonEncoder};
use crate::error::{DecodeError, DecodeErrorKind, EncodeError};
use crate::sink::JsonSink;
use crate::source::JsonSource;
use crate::types::TypeTag;

use std::marker::PhantomData;

/// An owned JSON document.
///
/// Object entries keep insertion order; duplicate keys are kept as-is.
/// `Int` covers everything a signed 64-bit integer holds, `UInt` the
/// positive range above it, and `BigInt` the decimal literals beyond both.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    BigInt(i128),
    Float(f64),
    Str(String),
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>),
}

/// Decodes one document into a [`JsonValue`].
pub fn decode_value(input: &[u8]) -> Result<(JsonValue, usize), DecodeError> {
    let mut sink = ValueBuilder::new();
    JsonDecoder::new().decode(&mut sink, input)
}

/// Encodes a [`JsonValue`] with default options.
pub fn encode_value(value: &JsonValue) -> Result<Vec<u8>, EncodeError> {
    encode_value_with(value, &EncodeOptions::default())
}

/// Encodes a [`JsonValue`] with the given options.
pub fn encode_value_with(
    value: &JsonValue,
    opts: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = JsonEncoder::with_options(opts.clone());
    let mut source = ValueSource::new();
    encoder.encode(&mut source, value)
}

/// Sink that assembles decoded pieces into a [`JsonValue`] tree.
#[derive(Debug, Default)]
pub struct ValueBuilder;

impl ValueBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl JsonSink for ValueBuilder {
    type Value = JsonValue;

    /// Code units become `char`s one-to-one. A unit no `char` can hold, a
    /// surrogate left unpaired by the decoder included, becomes U+FFFD.
    fn new_string(&mut self, units: &[u32]) -> Result<JsonValue, DecodeErrorKind> {
        let mut text = String::with_capacity(units.len());
        for &unit in units {
            text.push(char::from_u32(unit).unwrap_or('\u{FFFD}'));
        }
        Ok(JsonValue::Str(text))
    }

    fn new_int(&mut self, value: i32) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Int(i64::from(value)))
    }

    fn new_long(&mut self, value: i64) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Int(value))
    }

    fn new_unsigned_long(&mut self, value: u64) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::UInt(value))
    }

    fn new_integer_from_string(&mut self, text: &str) -> Result<JsonValue, DecodeErrorKind> {
        text.parse::<i128>()
            .map(JsonValue::BigInt)
            .map_err(|_| DecodeErrorKind::BadNumber)
    }

    fn new_double(&mut self, value: f64) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Float(value))
    }

    fn new_true(&mut self) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Bool(true))
    }

    fn new_false(&mut self) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Bool(false))
    }

    fn new_null(&mut self) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Null)
    }

    fn new_nan(&mut self) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Float(f64::NAN))
    }

    fn new_pos_inf(&mut self) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Float(f64::INFINITY))
    }

    fn new_neg_inf(&mut self) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Float(f64::NEG_INFINITY))
    }

    fn new_array(&mut self) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Array(Vec::new()))
    }

    fn new_object(&mut self) -> Result<JsonValue, DecodeErrorKind> {
        Ok(JsonValue::Object(Vec::new()))
    }

    fn array_add_item(&mut self, array: &mut JsonValue, item: JsonValue) {
        if let JsonValue::Array(items) = array {
            items.push(item);
        }
    }

    fn object_add_key(&mut self, object: &mut JsonValue, key: JsonValue, value: JsonValue) {
        let key = match key {
            JsonValue::Str(key) => key,
            other => format!("{other:?}"),
        };
        if let JsonValue::Object(entries) = object {
            entries.push((key, value));
        }
    }
}

/// Source that walks a [`JsonValue`] tree for the encoder.
#[derive(Debug, Default)]
pub struct ValueSource<'a> {
    _marker: PhantomData<&'a JsonValue>,
}

impl ValueSource<'_> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

/// Per-value scratch for [`ValueSource`]: container iteration state and the
/// decimal text of a `BigInt` while the encoder borrows it.
#[derive(Debug, Default)]
pub struct ValueContext<'a> {
    items: &'a [JsonValue],
    entries: Vec<(&'a str, &'a JsonValue)>,
    cursor: usize,
    digits: String,
}

impl<'a> JsonSource for ValueSource<'a> {
    type Value = &'a JsonValue;
    type Context = ValueContext<'a>;

    fn begin(&mut self, value: &Self::Value, opts: &EncodeOptions) -> (TypeTag, Self::Context) {
        let mut ctx = ValueContext::default();
        let tag = match *value {
            JsonValue::Null => TypeTag::Null,
            JsonValue::Bool(true) => TypeTag::True,
            JsonValue::Bool(false) => TypeTag::False,
            JsonValue::Int(v) => {
                if i32::try_from(*v).is_ok() {
                    TypeTag::Int32
                } else {
                    TypeTag::Int64
                }
            }
            JsonValue::UInt(_) => TypeTag::UInt64,
            JsonValue::BigInt(v) => {
                ctx.digits = v.to_string();
                TypeTag::Raw
            }
            JsonValue::Float(_) => TypeTag::Double,
            JsonValue::Str(_) => TypeTag::Utf8String,
            JsonValue::Array(items) => {
                ctx.items = items;
                TypeTag::Array
            }
            JsonValue::Object(entries) => {
                ctx.entries = entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
                if opts.sort_keys {
                    // Stable, so duplicate keys keep insertion order.
                    ctx.entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
                }
                TypeTag::Object
            }
        };
        (tag, ctx)
    }

    fn end(&mut self, _value: &Self::Value, _ctx: Self::Context) {}

    fn string_value<'c>(
        &mut self,
        value: &Self::Value,
        ctx: &'c mut Self::Context,
    ) -> Option<&'c [u8]> {
        match *value {
            JsonValue::Str(text) => Some(text.as_bytes()),
            JsonValue::BigInt(_) => Some(ctx.digits.as_bytes()),
            _ => None,
        }
    }

    fn long_value(&mut self, value: &Self::Value, _ctx: &mut Self::Context) -> i64 {
        match *value {
            JsonValue::Int(v) => *v,
            _ => 0,
        }
    }

    fn unsigned_long_value(&mut self, value: &Self::Value, _ctx: &mut Self::Context) -> u64 {
        match *value {
            JsonValue::UInt(v) => *v,
            _ => 0,
        }
    }

    fn double_value(&mut self, value: &Self::Value, _ctx: &mut Self::Context) -> f64 {
        match *value {
            JsonValue::Float(v) => *v,
            _ => 0.0,
        }
    }

    fn iter_begin(&mut self, _value: &Self::Value, ctx: &mut Self::Context) {
        ctx.cursor = 0;
    }

    fn iter_next(&mut self, _value: &Self::Value, ctx: &mut Self::Context) -> bool {
        // One of the two lists is always empty.
        let len = ctx.items.len() + ctx.entries.len();
        if ctx.cursor < len {
            ctx.cursor += 1;
            true
        } else {
            false
        }
    }

    fn iter_end(&mut self, _value: &Self::Value, _ctx: &mut Self::Context) {}

    fn iter_value(&mut self, _value: &Self::Value, ctx: &mut Self::Context) -> Self::Value {
        let at = ctx.cursor - 1;
        if ctx.entries.is_empty() {
            let items = ctx.items;
            &items[at]
        } else {
            ctx.entries[at].1
        }
    }

    fn iter_name<'c>(
        &mut self,
        _value: &Self::Value,
        ctx: &'c mut Self::Context,
    ) -> Option<&'c [u8]> {
        ctx.entries.get(ctx.cursor - 1).map(|(k, _)| k.as_bytes())
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    JsonValue::Int(v)
                } else if let Some(v) = n.as_u64() {
                    JsonValue::UInt(v)
                } else {
                    JsonValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => JsonValue::Str(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(entries) => JsonValue::Object(
                entries.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<JsonValue> for serde_json::Value {
    /// Lossy at the edges of the `serde_json` model: `BigInt` becomes its
    /// decimal text as a string, non-finite floats become `Null`.
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => serde_json::Value::Null,
            JsonValue::Bool(b) => serde_json::Value::Bool(b),
            JsonValue::Int(v) => v.into(),
            JsonValue::UInt(v) => v.into(),
            JsonValue::BigInt(v) => serde_json::Value::String(v.to_string()),
            JsonValue::Float(v) => serde_json::Number::from_f64(v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            JsonValue::Str(s) => serde_json::Value::String(s),
            JsonValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            JsonValue::Object(entries) => serde_json::Value::Object(
                entries.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}
