//! `JsonEncoder` — recursive tree walker emitting JSON bytes.
//!
//! The walk never inspects host values directly; a [`JsonSource`] classifies
//! each handle with a [`TypeTag`] and the encoder picks the getter family
//! the tag selects. Output goes through an owned [`Writer`] so back-to-back
//! encodes reuse one allocation.

use anyjson_buffers::Writer;

use crate::error::EncodeError;
use crate::source::JsonSource;
use crate::types::TypeTag;

const HEX_CHARS: [u8; 16] = *b"0123456789abcdef";

// Escape classes 10-24 index this table at `class - 10`.
const ESCAPE_PAIRS: [u8; 16] = *b"\\b\\t\\n\\f\\r\\\"\\\\\\/";

// Escape classes beyond the UTF-8 lengths 2-4.
const EC_PLAIN: u8 = 1;
const EC_BAD_LEAD: u8 = 5;
const EC_CONT: u8 = 6;
const EC_BACKSPACE: u8 = 10;
const EC_TAB: u8 = 12;
const EC_NEWLINE: u8 = 14;
const EC_FORMFEED: u8 = 16;
const EC_CARRIAGE: u8 = 18;
const EC_QUOTE: u8 = 20;
const EC_BACKSLASH: u8 = 22;
const EC_SOLIDUS: u8 = 24;
const EC_HTML: u8 = 29;
const EC_CONTROL: u8 = 30;

/// Per-byte classes for both escapers: plain copy, two-byte escape pairs,
/// `\u00XX` controls, the optional `/` and HTML rewrites, and UTF-8 lead
/// bytes by sequence length. Continuation bytes carry their own class so
/// the validated escaper can tell a stray one from a sequence it walked.
static ESCAPE_CLASS: [u8; 256] = [
    /* 0x00 */ 30, 30, 30, 30, 30, 30, 30, 30, EC_BACKSPACE, EC_TAB, EC_NEWLINE, 30, EC_FORMFEED,
    EC_CARRIAGE, 30, 30,
    /* 0x10 */ 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    /* 0x20 */ 1, 1, EC_QUOTE, 1, 1, 1, EC_HTML, 1, 1, 1, 1, 1, 1, 1, 1, EC_SOLIDUS,
    /* 0x30 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, EC_HTML, 1, EC_HTML, 1,
    /* 0x40 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x50 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, EC_BACKSLASH, 1, 1, 1,
    /* 0x60 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x70 */ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* 0x80 */ 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    /* 0x90 */ 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    /* 0xa0 */ 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    /* 0xb0 */ 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
    /* 0xc0 */ 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    /* 0xd0 */ 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    /* 0xe0 */ 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3,
    /* 0xf0 */ 4, 4, 4, 4, 4, 4, 4, 4, EC_BAD_LEAD, EC_BAD_LEAD, EC_BAD_LEAD, EC_BAD_LEAD,
    EC_BAD_LEAD, EC_BAD_LEAD, EC_BAD_LEAD, EC_BAD_LEAD,
];

/// Encode-side formatting and limit knobs.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Recursion ceiling for nested containers.
    pub recursion_max: usize,
    /// Escape every non-ASCII unit as `\uXXXX`, validating UTF-8 along the
    /// way. Off, output is UTF-8 and string bytes pass through unchecked.
    pub force_ascii: bool,
    /// Rewrite `<` `>` `&` as `\u00XX`.
    pub escape_html: bool,
    /// Rewrite `/` as `\/`.
    pub escape_forward_slashes: bool,
    /// Ask the source to present object entries in key order.
    pub sort_keys: bool,
    /// Spaces per nesting level; zero keeps the output on one line.
    pub indent: usize,
    /// Spell non-finite doubles as `NaN`/`Infinity`/`-Infinity` instead of
    /// failing.
    pub allow_nan: bool,
    /// Text between container items.
    pub item_separator: String,
    /// Text between an object key and its value.
    pub key_separator: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            recursion_max: 1024,
            force_ascii: false,
            escape_html: false,
            escape_forward_slashes: false,
            sort_keys: false,
            indent: 0,
            allow_nan: true,
            item_separator: ",".to_owned(),
            key_separator: ":".to_owned(),
        }
    }
}

impl EncodeOptions {
    /// Multi-line preset: `indent` spaces per level and a space after each
    /// key separator.
    pub fn pretty(indent: usize) -> Self {
        Self {
            indent,
            key_separator: ": ".to_owned(),
            ..Self::default()
        }
    }
}

/// JSON encoder over a caller-supplied source.
///
/// Owns its output buffer and double formatter; create once, encode many.
pub struct JsonEncoder {
    pub writer: Writer,
    opts: EncodeOptions,
    dtoa: ryu::Buffer,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::with_options(EncodeOptions::default())
    }

    pub fn with_options(opts: EncodeOptions) -> Self {
        Self::with_writer(opts, Writer::new())
    }

    pub fn with_writer(opts: EncodeOptions, writer: Writer) -> Self {
        Self {
            writer,
            opts,
            dtoa: ryu::Buffer::new(),
        }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.opts
    }

    /// Encodes `root` and returns the document as an owned vector.
    pub fn encode<S: JsonSource>(
        &mut self,
        source: &mut S,
        root: S::Value,
    ) -> Result<Vec<u8>, EncodeError> {
        self.encode_root(source, &root)?;
        Ok(self.writer.flush())
    }

    /// Encodes `root` and returns a view into the internal buffer. The
    /// buffer is reused by the next encode, so this avoids the final copy
    /// when the caller consumes the bytes immediately.
    pub fn encode_slice<S: JsonSource>(
        &mut self,
        source: &mut S,
        root: S::Value,
    ) -> Result<&[u8], EncodeError> {
        self.encode_root(source, &root)?;
        Ok(self.writer.written())
    }

    fn encode_root<S: JsonSource>(
        &mut self,
        source: &mut S,
        root: &S::Value,
    ) -> Result<(), EncodeError> {
        self.writer.reset();
        match self.encode_node(source, root, None, 0) {
            Ok(()) => Ok(()),
            Err(err) => {
                // Drop the partial document so the writer stays reusable.
                self.writer.rewind();
                Err(err)
            }
        }
    }

    /// One value, preceded by its escaped key when `name` is given.
    fn encode_node<S: JsonSource>(
        &mut self,
        source: &mut S,
        value: &S::Value,
        name: Option<&[u8]>,
        depth: usize,
    ) -> Result<(), EncodeError> {
        if depth > self.opts.recursion_max {
            return Err(EncodeError::RecursionLimit);
        }
        if let Some(name) = name {
            self.writer
                .ensure_capacity(2 + 6 * name.len() + self.opts.key_separator.len());
            self.writer.u8(b'"');
            self.escape_string(name)?;
            self.writer.u8(b'"');
            self.writer.ascii(self.opts.key_separator.as_str());
        }
        let (tag, mut ctx) = source.begin(value, &self.opts);
        // Covers brackets, literals, and the widest number text below.
        self.writer.ensure_capacity(128);
        let result = match tag {
            // The begin contract: no context to close on this tag, so the
            // return must bypass the end call below.
            TypeTag::Invalid => return Err(EncodeError::InvalidType),
            TypeTag::Null => {
                self.writer.u32(u32::from_be_bytes(*b"null"));
                Ok(())
            }
            TypeTag::True => {
                self.writer.u32(u32::from_be_bytes(*b"true"));
                Ok(())
            }
            TypeTag::False => {
                self.writer.u32(u32::from_be_bytes(*b"fals"));
                self.writer.u8(b'e');
                Ok(())
            }
            TypeTag::Int32 | TypeTag::Int64 => {
                let v = source.long_value(value, &mut ctx);
                self.append_long(v);
                Ok(())
            }
            TypeTag::UInt64 => {
                let v = source.unsigned_long_value(value, &mut ctx);
                self.append_unsigned_long(v);
                Ok(())
            }
            TypeTag::Double => {
                let v = source.double_value(value, &mut ctx);
                self.append_double(v)
            }
            TypeTag::Nan => self.append_non_finite("NaN"),
            TypeTag::PosInf => self.append_non_finite("Infinity"),
            TypeTag::NegInf => self.append_non_finite("-Infinity"),
            TypeTag::Utf8String => match source.string_value(value, &mut ctx) {
                None => Err(EncodeError::StringFetch),
                Some(bytes) => {
                    self.writer.ensure_capacity(2 + 6 * bytes.len());
                    self.writer.u8(b'"');
                    let escaped = self.escape_string(bytes);
                    if escaped.is_ok() {
                        self.writer.u8(b'"');
                    }
                    escaped
                }
            },
            TypeTag::Raw => match source.string_value(value, &mut ctx) {
                None => Err(EncodeError::StringFetch),
                Some(bytes) => {
                    self.writer.buf(bytes);
                    Ok(())
                }
            },
            TypeTag::Array => self.encode_array(source, value, &mut ctx, depth),
            TypeTag::Object => self.encode_object(source, value, &mut ctx, depth),
        };
        source.end(value, ctx);
        result
    }

    fn encode_array<S: JsonSource>(
        &mut self,
        source: &mut S,
        value: &S::Value,
        ctx: &mut S::Context,
        depth: usize,
    ) -> Result<(), EncodeError> {
        self.writer.u8(b'[');
        source.iter_begin(value, ctx);
        let mut count = 0usize;
        while source.iter_next(value, ctx) {
            // Separator plus the optional newline and next-level indent.
            self.writer.ensure_capacity(
                self.opts.indent * (depth + 1) + self.opts.item_separator.len() + 1,
            );
            if count > 0 {
                self.writer.ascii(self.opts.item_separator.as_str());
            }
            self.append_indent_newline();
            let item = source.iter_value(value, ctx);
            self.append_indent(depth + 1);
            if let Err(err) = self.encode_node(source, &item, None, depth + 1) {
                source.iter_end(value, ctx);
                return Err(err);
            }
            count += 1;
        }
        source.iter_end(value, ctx);
        if count > 0 {
            self.writer.ensure_capacity(self.opts.indent * depth + 1);
            self.append_indent_newline();
            self.append_indent(depth);
        }
        self.writer.u8(b']');
        Ok(())
    }

    fn encode_object<S: JsonSource>(
        &mut self,
        source: &mut S,
        value: &S::Value,
        ctx: &mut S::Context,
        depth: usize,
    ) -> Result<(), EncodeError> {
        self.writer.u8(b'{');
        source.iter_begin(value, ctx);
        let mut count = 0usize;
        while source.iter_next(value, ctx) {
            self.writer.ensure_capacity(
                self.opts.indent * (depth + 1) + self.opts.item_separator.len() + 1,
            );
            if count > 0 {
                self.writer.ascii(self.opts.item_separator.as_str());
            }
            self.append_indent_newline();
            let item = source.iter_value(value, ctx);
            self.append_indent(depth + 1);
            let Some(key) = source.iter_name(value, ctx) else {
                source.iter_end(value, ctx);
                return Err(EncodeError::StringFetch);
            };
            if let Err(err) = self.encode_node(source, &item, Some(key), depth + 1) {
                source.iter_end(value, ctx);
                return Err(err);
            }
            count += 1;
        }
        source.iter_end(value, ctx);
        if count > 0 {
            self.writer.ensure_capacity(self.opts.indent * depth + 1);
            self.append_indent_newline();
            self.append_indent(depth);
        }
        self.writer.u8(b'}');
        Ok(())
    }

    fn append_indent_newline(&mut self) {
        if self.opts.indent > 0 {
            self.writer.u8(b'\n');
        }
    }

    fn append_indent(&mut self, level: usize) {
        if self.opts.indent > 0 {
            self.writer.fill(b' ', self.opts.indent * level);
        }
    }

    /// Decimal text, written reversed and flipped in place.
    fn append_long(&mut self, value: i64) {
        let mut rest = value.unsigned_abs();
        let w = &mut self.writer;
        w.ensure_capacity(21);
        let start = w.x;
        loop {
            w.uint8[w.x] = b'0' + (rest % 10) as u8;
            w.x += 1;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        if value < 0 {
            w.uint8[w.x] = b'-';
            w.x += 1;
        }
        w.uint8[start..w.x].reverse();
    }

    fn append_unsigned_long(&mut self, value: u64) {
        let mut rest = value;
        let w = &mut self.writer;
        w.ensure_capacity(20);
        let start = w.x;
        loop {
            w.uint8[w.x] = b'0' + (rest % 10) as u8;
            w.x += 1;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        w.uint8[start..w.x].reverse();
    }

    /// Shortest round-trip text for finite doubles; spelled-out non-finite
    /// values behind the `allow_nan` gate.
    fn append_double(&mut self, value: f64) -> Result<(), EncodeError> {
        if value.is_finite() {
            let text = self.dtoa.format_finite(value);
            self.writer.ascii(text);
            Ok(())
        } else if value.is_nan() {
            self.append_non_finite("NaN")
        } else if value == f64::INFINITY {
            self.append_non_finite("Infinity")
        } else {
            self.append_non_finite("-Infinity")
        }
    }

    fn append_non_finite(&mut self, text: &'static str) -> Result<(), EncodeError> {
        if !self.opts.allow_nan {
            return Err(EncodeError::NonFiniteDouble);
        }
        self.writer.ascii(text);
        Ok(())
    }

    fn escape_string(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        if self.opts.force_ascii {
            self.escape_validated(bytes)
        } else {
            self.escape_unvalidated(bytes);
            Ok(())
        }
    }

    /// Fast path: rewrites the mandatory escapes and copies everything
    /// else, non-ASCII bytes included, without looking at them.
    fn escape_unvalidated(&mut self, bytes: &[u8]) {
        for &b in bytes {
            match ESCAPE_CLASS[b as usize] {
                EC_CONTROL => self.append_unicode_escape(u32::from(b)),
                EC_HTML => {
                    if self.opts.escape_html {
                        self.append_unicode_escape(u32::from(b));
                    } else {
                        self.writer.u8(b);
                    }
                }
                EC_SOLIDUS if !self.opts.escape_forward_slashes => self.writer.u8(b),
                class @ EC_BACKSPACE..=EC_SOLIDUS => {
                    let at = (class - 10) as usize;
                    self.writer.buf(&ESCAPE_PAIRS[at..at + 2]);
                }
                _ => self.writer.u8(b),
            }
        }
    }

    /// Force-ASCII path: same rewrites, but every non-ASCII sequence is
    /// validated the way the decoder validates it and emitted as `\uXXXX`.
    fn escape_validated(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            match ESCAPE_CLASS[b as usize] {
                EC_PLAIN => {
                    self.writer.u8(b);
                    i += 1;
                }
                // A stray continuation byte scans as a single unit.
                EC_CONT => {
                    self.append_unicode_escape(u32::from(b));
                    i += 1;
                }
                len @ 2..=4 => i = self.escape_multibyte(bytes, i, len)?,
                EC_BAD_LEAD => return Err(EncodeError::InvalidUtf8Length),
                EC_CONTROL => {
                    self.append_unicode_escape(u32::from(b));
                    i += 1;
                }
                EC_HTML => {
                    if self.opts.escape_html {
                        self.append_unicode_escape(u32::from(b));
                    } else {
                        self.writer.u8(b);
                    }
                    i += 1;
                }
                EC_SOLIDUS if !self.opts.escape_forward_slashes => {
                    self.writer.u8(b);
                    i += 1;
                }
                class => {
                    let at = (class - 10) as usize;
                    self.writer.buf(&ESCAPE_PAIRS[at..at + 2]);
                    i += 1;
                }
            }
        }
        Ok(())
    }

    /// Validates one 2-4 byte UTF-8 sequence and emits it as `\uXXXX`,
    /// split into a surrogate pair beyond the basic plane. Returns the
    /// index past the sequence.
    fn escape_multibyte(&mut self, bytes: &[u8], at: usize, len: u8) -> Result<usize, EncodeError> {
        let need = len as usize;
        if at + need > bytes.len() {
            return Err(EncodeError::TruncatedUtf8);
        }
        let lead = bytes[at];
        let (mut ucs, min) = match len {
            2 => (u32::from(lead & 0x1F), 0x80),
            3 => (u32::from(lead & 0x0F), 0x800),
            _ => (u32::from(lead & 0x07), 0x10000),
        };
        for i in 1..need {
            let oct = bytes[at + i];
            if oct & 0xC0 != 0x80 {
                return Err(EncodeError::InvalidUtf8Octet);
            }
            ucs = (ucs << 6) | u32::from(oct & 0x3F);
        }
        if ucs < min {
            return Err(EncodeError::OverlongUtf8(len));
        }
        if ucs < 0x10000 {
            self.append_unicode_escape(ucs);
        } else {
            let v = ucs - 0x10000;
            self.append_unicode_escape((v >> 10) + 0xD800);
            self.append_unicode_escape((v & 0x3FF) + 0xDC00);
        }
        Ok(at + need)
    }

    fn append_unicode_escape(&mut self, unit: u32) {
        let w = &mut self.writer;
        w.ensure_capacity(6);
        let x = w.x;
        w.uint8[x] = b'\\';
        w.uint8[x + 1] = b'u';
        w.uint8[x + 2] = HEX_CHARS[(unit >> 12) as usize & 0xF];
        w.uint8[x + 3] = HEX_CHARS[(unit >> 8) as usize & 0xF];
        w.uint8[x + 4] = HEX_CHARS[(unit >> 4) as usize & 0xF];
        w.uint8[x + 5] = HEX_CHARS[unit as usize & 0xF];
        w.x = x + 6;
    }
}
