//! `JsonDecoder` — byte-stream JSON scanner feeding a [`JsonSink`].
//!
//! One forward pass, dispatching on the leading byte of each value. The
//! scanner never builds values itself; everything goes through sink
//! factories and comes back as opaque handles.

use lexical_parse_float::FromLexical;
use smallvec::SmallVec;

use crate::error::{DecodeError, DecodeErrorKind};
use crate::sink::JsonSink;
use crate::types::TypeTag;

/// Stack capacity of the unescape scratch, in 32-bit units. Longer strings
/// spill to the heap.
const UNESCAPE_STACK_UNITS: usize = 256;

// String scanner sentinels. Values 1-4 in the class table are UTF-8
// sequence lengths.
const SC_NUL: u8 = 0x32;
const SC_QUOTE: u8 = 0x33;
const SC_ESCAPE: u8 = 0x34;
const SC_BAD_LENGTH: u8 = 0x35;

/// Per-byte classes for the string scanner: copy-through (1), UTF-8 lead
/// bytes by sequence length (2-4), and sentinels for the closing quote,
/// backslash, embedded NUL, and lead bytes beyond four-byte sequences.
static STRING_CLASS: [u8; 256] = [
    /* 0x00 */ SC_NUL, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x10 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x20 */ 1, 1, SC_QUOTE, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x30 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x40 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x50 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, SC_ESCAPE, 1, 1, 1,
    /* 0x60 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x70 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x80 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x90 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0xa0 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0xb0 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0xc0 */ 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    /* 0xd0 */ 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    /* 0xe0 */ 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3,
    /* 0xf0 */ 4, 4, 4, 4, 4, 4, 4, 4, SC_BAD_LENGTH, SC_BAD_LENGTH, SC_BAD_LENGTH, SC_BAD_LENGTH,
    SC_BAD_LENGTH, SC_BAD_LENGTH, SC_BAD_LENGTH, SC_BAD_LENGTH,
];

/// Decode-side limits and extensions.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Container nesting ceiling, shared by arrays and objects.
    pub max_depth: usize,
    /// Recognize the `NaN`/`Infinity`/`-Infinity` extension literals.
    pub allow_nan: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            allow_nan: true,
        }
    }
}

/// JSON decoder over a caller-supplied sink.
///
/// The decoder itself only holds options; all per-call state lives on the
/// stack of [`decode`](JsonDecoder::decode), so one decoder can be shared
/// freely.
pub struct JsonDecoder {
    opts: DecodeOptions,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonDecoder {
    pub fn new() -> Self {
        Self::with_options(DecodeOptions::default())
    }

    pub fn with_options(opts: DecodeOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.opts
    }

    /// Decodes one complete JSON document from `input`.
    ///
    /// `input` must contain exactly one document; anything but whitespace
    /// after it is [`TrailingData`](DecodeErrorKind::TrailingData). Returns
    /// the root handle and the number of bytes consumed.
    pub fn decode<S: JsonSink>(
        &self,
        sink: &mut S,
        input: &[u8],
    ) -> Result<(S::Value, usize), DecodeError> {
        let mut state = DecoderState {
            buf: input,
            pos: 0,
            depth: 0,
            last_type: TypeTag::Invalid,
            esc: SmallVec::new(),
            opts: self.opts,
            sink,
        };
        let value = state.decode_any()?;
        state.skip_whitespace();
        if state.pos != input.len() {
            let err = state.err(DecodeErrorKind::TrailingData);
            state.sink.release(value);
            return Err(err);
        }
        Ok((value, state.pos))
    }
}

struct DecoderState<'a, S: JsonSink> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
    last_type: TypeTag,
    esc: SmallVec<[u32; UNESCAPE_STACK_UNITS]>,
    opts: DecodeOptions,
    sink: &'a mut S,
}

impl<S: JsonSink> DecoderState<'_, S> {
    fn err(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(kind, self.pos)
    }

    fn err_at(&self, kind: DecodeErrorKind, offset: usize) -> DecodeError {
        DecodeError::new(kind, offset)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.buf.get(self.pos) {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn decode_any(&mut self) -> Result<S::Value, DecodeError> {
        self.skip_whitespace();
        let Some(&b) = self.buf.get(self.pos) else {
            return Err(self.err(DecodeErrorKind::ExpectedValue));
        };
        match b {
            b'"' => self.decode_string(),
            b'0'..=b'9' | b'-' => self.decode_numeric(),
            b'I' | b'N' if self.opts.allow_nan => self.decode_numeric(),
            b'[' => self.decode_array(),
            b'{' => self.decode_object(),
            b't' => {
                self.expect_literal(b"true", "true")?;
                self.last_type = TypeTag::True;
                self.sink.new_true().map_err(|k| self.err(k))
            }
            b'f' => {
                self.expect_literal(b"false", "false")?;
                self.last_type = TypeTag::False;
                self.sink.new_false().map_err(|k| self.err(k))
            }
            b'n' => {
                self.expect_literal(b"null", "null")?;
                self.last_type = TypeTag::Null;
                self.sink.new_null().map_err(|k| self.err(k))
            }
            _ => Err(self.err(DecodeErrorKind::ExpectedValue)),
        }
    }

    /// Consumes `text` letter by letter, reporting the first mismatch.
    fn expect_literal(&mut self, text: &'static [u8], name: &'static str) -> Result<(), DecodeError> {
        for (i, &expect) in text.iter().enumerate() {
            match self.buf.get(self.pos + i) {
                Some(&got) if got == expect => {}
                _ => {
                    return Err(self.err_at(DecodeErrorKind::BadLiteral(name), self.pos + i));
                }
            }
        }
        self.pos += text.len();
        Ok(())
    }

    // ---------------------------------------------------------------- numbers

    /// Integer scan with optimistic `u64` accumulation. Digits run through
    /// per-step overflow prechecks; an overflowed span is re-routed,
    /// untouched, to `new_integer_from_string`, and a `.`/`e`/`E` hands the
    /// whole literal to the float parser.
    fn decode_numeric(&mut self) -> Result<S::Value, DecodeError> {
        let start = self.pos;
        let mut neg = false;
        // Magnitude ceiling: full u64 range when positive, 2^63 when signed.
        let mut max: u64 = u64::MAX;
        match self.buf[self.pos] {
            b'I' => return self.decode_infinity(false),
            b'N' => {
                self.expect_literal(b"NaN", "NaN")?;
                self.last_type = TypeTag::Nan;
                return self.sink.new_nan().map_err(|k| self.err(k));
            }
            b'-' => {
                self.pos += 1;
                neg = true;
                if self.opts.allow_nan && self.buf.get(self.pos) == Some(&b'I') {
                    return self.decode_infinity(true);
                }
                max = i64::MIN.unsigned_abs();
            }
            _ => {}
        }
        let overflow_limit = max / 10;
        let digits_start = self.pos;
        let mut value: u64 = 0;
        let mut has_overflow = false;
        while let Some(&b) = self.buf.get(self.pos) {
            match b {
                b'0'..=b'9' => {
                    if value > overflow_limit {
                        has_overflow = true;
                    }
                    value = value.wrapping_mul(10);
                    let add = u64::from(b - b'0');
                    if max.wrapping_sub(value) < add {
                        has_overflow = true;
                    }
                    value = value.wrapping_add(add);
                    self.pos += 1;
                }
                b'.' | b'e' | b'E' => return self.decode_double(start),
                _ => break,
            }
        }
        if self.pos == digits_start {
            return Err(self.err_at(DecodeErrorKind::BadNumber, start));
        }
        if has_overflow {
            let buf = self.buf;
            let text = std::str::from_utf8(&buf[start..self.pos])
                .map_err(|_| self.err_at(DecodeErrorKind::BadNumber, start))?;
            self.last_type = TypeTag::Int64;
            return self.sink.new_integer_from_string(text).map_err(|k| self.err(k));
        }
        if !neg && value & 0x8000_0000_0000_0000 != 0 {
            self.last_type = TypeTag::UInt64;
            self.sink.new_unsigned_long(value).map_err(|k| self.err(k))
        } else if value >> 31 != 0 {
            self.last_type = TypeTag::Int64;
            let v = if neg {
                (value as i64).wrapping_neg()
            } else {
                value as i64
            };
            self.sink.new_long(v).map_err(|k| self.err(k))
        } else {
            self.last_type = TypeTag::Int32;
            let v = if neg { -(value as i32) } else { value as i32 };
            self.sink.new_int(v).map_err(|k| self.err(k))
        }
    }

    fn decode_infinity(&mut self, neg: bool) -> Result<S::Value, DecodeError> {
        if neg {
            self.expect_literal(b"Infinity", "-Infinity")?;
            self.last_type = TypeTag::NegInf;
            self.sink.new_neg_inf().map_err(|k| self.err(k))
        } else {
            self.expect_literal(b"Infinity", "Infinity")?;
            self.last_type = TypeTag::PosInf;
            self.sink.new_pos_inf().map_err(|k| self.err(k))
        }
    }

    /// Hands the literal starting at `start` to the float parser, which
    /// consumes a maximal prefix and reports how many bytes it took.
    fn decode_double(&mut self, start: usize) -> Result<S::Value, DecodeError> {
        let buf = self.buf;
        let (value, consumed) = f64::from_lexical_partial(&buf[start..])
            .map_err(|_| self.err_at(DecodeErrorKind::BadNumber, start))?;
        if consumed == 0 {
            return Err(self.err_at(DecodeErrorKind::BadNumber, start));
        }
        self.pos = start + consumed;
        self.last_type = TypeTag::Double;
        self.sink.new_double(value).map_err(|k| self.err(k))
    }

    // ---------------------------------------------------------------- strings

    /// Unescapes one string into the scratch as 32-bit units, then hands
    /// the whole span to `new_string`.
    fn decode_string(&mut self) -> Result<S::Value, DecodeError> {
        let quote = self.pos;
        self.pos += 1;
        self.last_type = TypeTag::Invalid;
        self.esc.clear();
        // Worst case one unit per remaining input byte.
        self.esc.reserve(self.buf.len() - self.pos);
        // End position of the hex run of the most recent high surrogate.
        let mut last_high: Option<usize> = None;
        loop {
            let Some(&b) = self.buf.get(self.pos) else {
                return Err(self.err_at(DecodeErrorKind::UnterminatedString, quote));
            };
            match STRING_CLASS[b as usize] {
                SC_QUOTE => {
                    self.pos += 1;
                    self.last_type = TypeTag::Utf8String;
                    return self.sink.new_string(&self.esc).map_err(|k| self.err(k));
                }
                SC_NUL => {
                    return Err(self.err_at(DecodeErrorKind::UnterminatedString, quote));
                }
                SC_ESCAPE => self.decode_escape(&mut last_high)?,
                SC_BAD_LENGTH => {
                    return Err(self.err(DecodeErrorKind::InvalidUtf8Length));
                }
                len @ 2..=4 => self.decode_multibyte(len)?,
                _ => {
                    self.esc.push(u32::from(b));
                    self.pos += 1;
                }
            }
        }
    }

    fn decode_escape(&mut self, last_high: &mut Option<usize>) -> Result<(), DecodeError> {
        self.pos += 1; // backslash
        let Some(&b) = self.buf.get(self.pos) else {
            return Err(self.err(DecodeErrorKind::UnterminatedEscape));
        };
        let unit: u32 = match b {
            b'\\' => u32::from(b'\\'),
            b'"' => u32::from(b'"'),
            b'/' => u32::from(b'/'),
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => 0x0A,
            b'r' => 0x0D,
            b't' => 0x09,
            b'u' => return self.decode_unicode_escape(last_high),
            _ => return Err(self.err(DecodeErrorKind::UnrecognizedEscape)),
        };
        self.esc.push(unit);
        self.pos += 1;
        Ok(())
    }

    /// Reads the 4 hex digits of a `\u` escape. A low surrogate whose
    /// escape starts exactly where the previous high surrogate's ended
    /// replaces that unit with the combined supplementary code point.
    fn decode_unicode_escape(&mut self, last_high: &mut Option<usize>) -> Result<(), DecodeError> {
        self.pos += 1; // 'u'
        let mut ch: u32 = 0;
        for _ in 0..4 {
            let Some(&h) = self.buf.get(self.pos) else {
                return Err(self.err(DecodeErrorKind::UnterminatedEscape));
            };
            let digit = match h {
                b'0'..=b'9' => u32::from(h - b'0'),
                b'a'..=b'f' => u32::from(h - b'a') + 10,
                b'A'..=b'F' => u32::from(h - b'A') + 10,
                _ => return Err(self.err(DecodeErrorKind::BadUnicodeEscape)),
            };
            ch = (ch << 4) + digit;
            self.pos += 1;
        }
        let adjacent = *last_high == Some(self.pos - 6);
        match self.esc.last().copied() {
            Some(hi) if adjacent && ch & 0xFC00 == 0xDC00 && hi & 0xFC00 == 0xD800 => {
                let last = self.esc.len() - 1;
                self.esc[last] = (((hi - 0xD800) << 10) | (ch - 0xDC00)) + 0x10000;
            }
            _ => self.esc.push(ch),
        }
        if ch & 0xFC00 == 0xD800 {
            *last_high = Some(self.pos);
        }
        Ok(())
    }

    /// Validates and decodes one 2-4 byte UTF-8 sequence.
    fn decode_multibyte(&mut self, len: u8) -> Result<(), DecodeError> {
        let buf = self.buf;
        let need = len as usize;
        if self.pos + need > buf.len() {
            return Err(self.err(DecodeErrorKind::InvalidUtf8Octet));
        }
        let lead = buf[self.pos];
        let (mut ucs, min) = match len {
            2 => (u32::from(lead & 0x1F), 0x80),
            3 => (u32::from(lead & 0x0F), 0x800),
            _ => (u32::from(lead & 0x07), 0x10000),
        };
        for i in 1..need {
            let oct = buf[self.pos + i];
            if oct & 0xC0 != 0x80 {
                return Err(self.err_at(DecodeErrorKind::InvalidUtf8Octet, self.pos + i));
            }
            ucs = (ucs << 6) | u32::from(oct & 0x3F);
        }
        if ucs < min {
            return Err(self.err(DecodeErrorKind::OverlongUtf8(len)));
        }
        self.esc.push(ucs);
        self.pos += need;
        Ok(())
    }

    // ---------------------------------------------------------------- containers

    fn decode_array(&mut self) -> Result<S::Value, DecodeError> {
        self.depth += 1;
        if self.depth > self.opts.max_depth {
            return Err(self.err(DecodeErrorKind::DepthLimit));
        }
        let mut array = self.sink.new_array().map_err(|k| self.err(k))?;
        self.last_type = TypeTag::Invalid;
        self.pos += 1;
        let mut len = 0usize;
        loop {
            self.skip_whitespace();
            if self.buf.get(self.pos) == Some(&b']') {
                self.depth -= 1;
                if len == 0 {
                    self.pos += 1;
                    self.last_type = TypeTag::Array;
                    return Ok(array);
                }
                // Trailing comma before the bracket.
                let err = self.err(DecodeErrorKind::BadArrayValue);
                self.sink.release(array);
                return Err(err);
            }
            let item = match self.decode_any() {
                Ok(item) => item,
                Err(err) => {
                    self.sink.release(array);
                    return Err(err);
                }
            };
            self.sink.array_add_item(&mut array, item);
            self.skip_whitespace();
            match self.buf.get(self.pos) {
                Some(&b']') => {
                    self.depth -= 1;
                    self.pos += 1;
                    self.last_type = TypeTag::Array;
                    return Ok(array);
                }
                Some(&b',') => {
                    self.pos += 1;
                    len += 1;
                }
                _ => {
                    let err = self.err(DecodeErrorKind::BadArrayValue);
                    self.sink.release(array);
                    return Err(err);
                }
            }
        }
    }

    fn decode_object(&mut self) -> Result<S::Value, DecodeError> {
        self.depth += 1;
        if self.depth > self.opts.max_depth {
            return Err(self.err(DecodeErrorKind::DepthLimit));
        }
        let mut object = self.sink.new_object().map_err(|k| self.err(k))?;
        self.last_type = TypeTag::Invalid;
        self.pos += 1;
        let mut len = 0usize;
        loop {
            self.skip_whitespace();
            if self.buf.get(self.pos) == Some(&b'}') {
                self.depth -= 1;
                if len == 0 {
                    self.pos += 1;
                    self.last_type = TypeTag::Object;
                    return Ok(object);
                }
                // Trailing comma before the bracket.
                let err = self.err(DecodeErrorKind::BadObjectValue);
                self.sink.release(object);
                return Err(err);
            }
            self.last_type = TypeTag::Invalid;
            let key = match self.decode_any() {
                Ok(key) => key,
                Err(err) => {
                    self.sink.release(object);
                    return Err(err);
                }
            };
            if self.last_type != TypeTag::Utf8String {
                let err = self.err(DecodeErrorKind::KeyMustBeString);
                self.sink.release(object);
                self.sink.release(key);
                return Err(err);
            }
            self.skip_whitespace();
            if self.buf.get(self.pos) != Some(&b':') {
                let err = self.err(DecodeErrorKind::MissingColon);
                self.sink.release(object);
                self.sink.release(key);
                return Err(err);
            }
            self.pos += 1;
            let value = match self.decode_any() {
                Ok(value) => value,
                Err(err) => {
                    self.sink.release(object);
                    self.sink.release(key);
                    return Err(err);
                }
            };
            self.sink.object_add_key(&mut object, key, value);
            self.skip_whitespace();
            match self.buf.get(self.pos) {
                Some(&b'}') => {
                    self.depth -= 1;
                    self.pos += 1;
                    self.last_type = TypeTag::Object;
                    return Ok(object);
                }
                Some(&b',') => {
                    self.pos += 1;
                    len += 1;
                }
                _ => {
                    let err = self.err(DecodeErrorKind::BadObjectValue);
                    self.sink.release(object);
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{JsonValue, ValueBuilder};

    fn decode(input: &str) -> Result<JsonValue, DecodeError> {
        let decoder = JsonDecoder::new();
        let mut sink = ValueBuilder::new();
        decoder.decode(&mut sink, input.as_bytes()).map(|(v, _)| v)
    }

    fn decode_err(input: &str) -> DecodeError {
        match decode(input) {
            Ok(v) => panic!("expected error for {input:?}, got {v:?}"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(decode("null").unwrap(), JsonValue::Null);
        assert_eq!(decode("true").unwrap(), JsonValue::Bool(true));
        assert_eq!(decode("false").unwrap(), JsonValue::Bool(false));
        assert_eq!(decode("31337").unwrap(), JsonValue::Int(31337));
        assert_eq!(decode("-31337").unwrap(), JsonValue::Int(-31337));
        assert_eq!(decode("3.14").unwrap(), JsonValue::Float(3.14));
        assert_eq!(decode("\"hi\"").unwrap(), JsonValue::Str("hi".into()));
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(decode(" \t\r\n 7 \t\r\n ").unwrap(), JsonValue::Int(7));
    }

    #[test]
    fn test_trailing_data() {
        let err = decode_err("1 2");
        assert_eq!(err.kind, DecodeErrorKind::TrailingData);
        assert_eq!(err.offset, 2);
        assert_eq!(decode("1   ").unwrap(), JsonValue::Int(1));
    }

    #[test]
    fn test_integer_boundaries() {
        assert_eq!(decode("2147483647").unwrap(), JsonValue::Int(2147483647));
        assert_eq!(decode("-2147483648").unwrap(), JsonValue::Int(-2147483648));
        assert_eq!(
            decode("9223372036854775807").unwrap(),
            JsonValue::Int(i64::MAX)
        );
        assert_eq!(
            decode("-9223372036854775808").unwrap(),
            JsonValue::Int(i64::MIN)
        );
        assert_eq!(
            decode("9223372036854775808").unwrap(),
            JsonValue::UInt(9223372036854775808)
        );
        assert_eq!(
            decode("18446744073709551615").unwrap(),
            JsonValue::UInt(u64::MAX)
        );
    }

    #[test]
    fn test_integer_overflow_falls_back_to_text() {
        assert_eq!(
            decode("18446744073709551616").unwrap(),
            JsonValue::BigInt(18446744073709551616i128)
        );
        assert_eq!(
            decode("-9223372036854775809").unwrap(),
            JsonValue::BigInt(-9223372036854775809i128)
        );
    }

    #[test]
    fn test_leading_zeros_are_lenient() {
        assert_eq!(decode("01").unwrap(), JsonValue::Int(1));
    }

    #[test]
    fn test_sign_without_digits() {
        assert_eq!(decode_err("-").kind, DecodeErrorKind::BadNumber);
        assert_eq!(decode_err("-x").kind, DecodeErrorKind::BadNumber);
    }

    #[test]
    fn test_doubles() {
        assert_eq!(decode("1e3").unwrap(), JsonValue::Float(1000.0));
        assert_eq!(decode("-0.5").unwrap(), JsonValue::Float(-0.5));
        assert_eq!(decode("1.25E2").unwrap(), JsonValue::Float(125.0));
    }

    #[test]
    fn test_double_consumes_exact_prefix() {
        // The float parser stops before the dangling exponent marker, and
        // the leftover byte is trailing data.
        let err = decode_err("1.5e");
        assert_eq!(err.kind, DecodeErrorKind::TrailingData);
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn test_extension_literals() {
        assert!(matches!(decode("NaN").unwrap(), JsonValue::Float(f) if f.is_nan()));
        assert_eq!(decode("Infinity").unwrap(), JsonValue::Float(f64::INFINITY));
        assert_eq!(
            decode("-Infinity").unwrap(),
            JsonValue::Float(f64::NEG_INFINITY)
        );
        assert_eq!(decode_err("Infinit").kind, DecodeErrorKind::BadLiteral("Infinity"));
    }

    #[test]
    fn test_extension_literals_gated() {
        let decoder = JsonDecoder::with_options(DecodeOptions {
            allow_nan: false,
            ..DecodeOptions::default()
        });
        let mut sink = ValueBuilder::new();
        let err = decoder.decode(&mut sink, b"NaN").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::ExpectedValue);
        let err = decoder.decode(&mut sink, b"-Infinity").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::BadNumber);
    }

    #[test]
    fn test_bad_literals() {
        let err = decode_err("tru");
        assert_eq!(err.kind, DecodeErrorKind::BadLiteral("true"));
        assert_eq!(err.offset, 3);
        assert_eq!(decode_err("nulk").kind, DecodeErrorKind::BadLiteral("null"));
        assert_eq!(decode_err("falze").kind, DecodeErrorKind::BadLiteral("false"));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            decode(r#""a\"b\\c\/d\be\ff\ng\rh\ti""#).unwrap(),
            JsonValue::Str("a\"b\\c/d\u{8}e\u{c}f\ng\rh\ti".into())
        );
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(decode(r#""\u00e9""#).unwrap(), JsonValue::Str("é".into()));
        assert_eq!(decode(r#""\u041f""#).unwrap(), JsonValue::Str("П".into()));
    }

    #[test]
    fn test_surrogate_pair_combines() {
        assert_eq!(
            decode(r#""\ud83d\ude00""#).unwrap(),
            JsonValue::Str("\u{1F600}".into())
        );
    }

    #[test]
    fn test_separated_surrogates_do_not_combine() {
        // A byte between the escapes breaks adjacency; both halves are
        // unpaired and the builder substitutes U+FFFD.
        assert_eq!(
            decode(r#""\ud83d \ude00""#).unwrap(),
            JsonValue::Str("\u{FFFD} \u{FFFD}".into())
        );
    }

    #[test]
    fn test_lone_surrogate_is_replaced() {
        assert_eq!(
            decode(r#""\ud800""#).unwrap(),
            JsonValue::Str("\u{FFFD}".into())
        );
    }

    #[test]
    fn test_raw_utf8_passthrough() {
        assert_eq!(decode("\"héllo — ok\"").unwrap(), JsonValue::Str("héllo — ok".into()));
        assert_eq!(decode("\"\u{1F600}\"").unwrap(), JsonValue::Str("\u{1F600}".into()));
    }

    #[test]
    fn test_overlong_utf8_rejected() {
        let err = decode_err("\"\u{0}\"");
        // Embedded NUL reads as an unterminated string.
        assert_eq!(err.kind, DecodeErrorKind::UnterminatedString);

        let decoder = JsonDecoder::new();
        let mut sink = ValueBuilder::new();
        let err = decoder.decode(&mut sink, b"\"\xc0\x80\"").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::OverlongUtf8(2));
        let err = decoder.decode(&mut sink, b"\"\xe0\x80\xaf\"").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::OverlongUtf8(3));
    }

    #[test]
    fn test_utf8_sequence_errors() {
        let decoder = JsonDecoder::new();
        let mut sink = ValueBuilder::new();
        let err = decoder.decode(&mut sink, b"\"\xf8\x80\x80\x80\"").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidUtf8Length);
        let err = decoder.decode(&mut sink, b"\"\xc3(\"").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidUtf8Octet);
        let err = decoder.decode(&mut sink, b"\"\xe2\x82").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidUtf8Octet);
    }

    #[test]
    fn test_escape_errors() {
        assert_eq!(decode_err(r#""\x""#).kind, DecodeErrorKind::UnrecognizedEscape);
        assert_eq!(decode_err(r#""\"#).kind, DecodeErrorKind::UnterminatedEscape);
        assert_eq!(decode_err(r#""\u12"#).kind, DecodeErrorKind::UnterminatedEscape);
        assert_eq!(decode_err(r#""\u12g4""#).kind, DecodeErrorKind::BadUnicodeEscape);
        assert_eq!(decode_err("\"abc").kind, DecodeErrorKind::UnterminatedString);
    }

    #[test]
    fn test_arrays() {
        assert_eq!(decode("[]").unwrap(), JsonValue::Array(vec![]));
        assert_eq!(
            decode("[1, \"two\", [3]]").unwrap(),
            JsonValue::Array(vec![
                JsonValue::Int(1),
                JsonValue::Str("two".into()),
                JsonValue::Array(vec![JsonValue::Int(3)]),
            ])
        );
        assert_eq!(decode_err("[1,]").kind, DecodeErrorKind::BadArrayValue);
        assert_eq!(decode_err("[1 2]").kind, DecodeErrorKind::BadArrayValue);
        assert_eq!(decode_err("[1").kind, DecodeErrorKind::BadArrayValue);
    }

    #[test]
    fn test_objects() {
        assert_eq!(decode("{}").unwrap(), JsonValue::Object(vec![]));
        assert_eq!(
            decode(r#"{"a": 1, "b": [true]}"#).unwrap(),
            JsonValue::Object(vec![
                ("a".into(), JsonValue::Int(1)),
                ("b".into(), JsonValue::Array(vec![JsonValue::Bool(true)])),
            ])
        );
        assert_eq!(decode_err(r#"{"a": 1,}"#).kind, DecodeErrorKind::BadObjectValue);
        assert_eq!(decode_err(r#"{1: 2}"#).kind, DecodeErrorKind::KeyMustBeString);
        assert_eq!(decode_err(r#"{"a" 1}"#).kind, DecodeErrorKind::MissingColon);
        assert_eq!(decode_err(r#"{"a": 1"#).kind, DecodeErrorKind::BadObjectValue);
        assert_eq!(decode_err(r#"{"a":}"#).kind, DecodeErrorKind::ExpectedValue);
    }

    #[test]
    fn test_container_tags_are_not_keys() {
        assert_eq!(decode_err(r#"{["a"]: 1}"#).kind, DecodeErrorKind::KeyMustBeString);
    }

    #[test]
    fn test_depth_limit() {
        let decoder = JsonDecoder::with_options(DecodeOptions {
            max_depth: 3,
            ..DecodeOptions::default()
        });
        let mut sink = ValueBuilder::new();
        assert!(decoder.decode(&mut sink, b"[[[1]]]").is_ok());
        let err = decoder.decode(&mut sink, b"[[[[1]]]]").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::DepthLimit);
    }

    #[test]
    fn test_mixed_depth_shares_one_counter() {
        let decoder = JsonDecoder::with_options(DecodeOptions {
            max_depth: 2,
            ..DecodeOptions::default()
        });
        let mut sink = ValueBuilder::new();
        assert!(decoder.decode(&mut sink, br#"{"a": [1]}"#).is_ok());
        let err = decoder.decode(&mut sink, br#"{"a": [[1]]}"#).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::DepthLimit);
    }

    #[test]
    fn test_error_offsets() {
        assert_eq!(decode_err("[1, !]").offset, 4);
        assert_eq!(decode_err(r#"{"a" 1}"#).offset, 5);
        assert_eq!(decode_err("\"abc").offset, 0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode_err("").kind, DecodeErrorKind::ExpectedValue);
        assert_eq!(decode_err("   ").kind, DecodeErrorKind::ExpectedValue);
    }

    #[test]
    fn test_long_string_spills_scratch() {
        let body = "x".repeat(UNESCAPE_STACK_UNITS * 4);
        let doc = format!("\"{body}\"");
        assert_eq!(decode(&doc).unwrap(), JsonValue::Str(body));
    }
}
