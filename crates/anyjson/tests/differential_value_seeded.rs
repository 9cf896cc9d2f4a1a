use anyjson::{decode_value, encode_value, encode_value_with, EncodeOptions, JsonValue};
use serde_json::Value;

#[test]
fn differential_decode_matches_serde_parse() {
    for seed in seeds() {
        let doc = random_json(seed, 3);
        let text = serde_json::to_string(&doc).expect("serde encode must succeed");
        let expect = JsonValue::from(doc);
        let (got, consumed) = decode_value(text.as_bytes()).expect("decode must succeed");
        assert_eq!(consumed, text.len(), "consumed mismatch seed={seed}");
        assert_eq!(got, expect, "decode mismatch seed={seed}");
    }
}

#[test]
fn differential_encode_parses_back_through_serde() {
    for seed in seeds() {
        let doc = random_json(seed, 3);
        let tree = JsonValue::from(doc.clone());
        let bytes = encode_value(&tree).expect("encode must succeed");
        let parsed: Value = serde_json::from_slice(&bytes).expect("serde parse must succeed");
        assert_eq!(parsed, doc, "encode mismatch seed={seed}");
    }
}

#[test]
fn differential_roundtrip_seeded_trees() {
    let ascii = EncodeOptions {
        force_ascii: true,
        escape_html: true,
        escape_forward_slashes: true,
        ..EncodeOptions::default()
    };
    for seed in seeds() {
        let tree = random_tree(seed, 3);

        let bytes = encode_value(&tree).expect("encode must succeed");
        let (back, _) = decode_value(&bytes).expect("decode must succeed");
        assert_eq!(back, tree, "compact roundtrip mismatch seed={seed}");

        let bytes =
            encode_value_with(&tree, &EncodeOptions::pretty(2)).expect("encode must succeed");
        let (back, _) = decode_value(&bytes).expect("decode must succeed");
        assert_eq!(back, tree, "pretty roundtrip mismatch seed={seed}");

        let bytes = encode_value_with(&tree, &ascii).expect("encode must succeed");
        let (back, _) = decode_value(&bytes).expect("decode must succeed");
        assert_eq!(back, tree, "ascii roundtrip mismatch seed={seed}");
    }
}

fn seeds() -> [u64; 24] {
    [
        0x5eed_0001_u64,
        0x0000_0000_0000_0001_u64,
        0x0000_0000_0000_00ff_u64,
        0x0000_0000_00c0_ffee_u64,
        0x0123_4567_89ab_cdef_u64,
        0xfedc_ba98_7654_3210_u64,
        0x1111_1111_2222_2222_u64,
        0x3333_3333_4444_4444_u64,
        0x5555_5555_6666_6666_u64,
        0x7777_7777_8888_8888_u64,
        0x9999_9999_aaaa_aaaa_u64,
        0xbbbb_bbbb_cccc_cccc_u64,
        0x0f0f_f0f0_55aa_aa55_u64,
        0x1357_9bdf_2468_ace0_u64,
        0x0101_0101_0101_0101_u64,
        0x0202_0202_0202_0202_u64,
        0x0404_0404_0404_0404_u64,
        0x0808_0808_0808_0808_u64,
        0x1010_1010_1010_1010_u64,
        0x2020_2020_2020_2020_u64,
        0xcafe_0000_0000_0001_u64,
        0xcafe_0000_0000_0002_u64,
        0xcafe_0000_0000_0003_u64,
        0xcafe_0000_0000_0004_u64,
    ]
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn range(&mut self, n: u64) -> u64 {
        if n == 0 {
            0
        } else {
            self.next_u64() % n
        }
    }
}

const ALPHABET: &[&str] = &[
    "a", "b", "z", "é", "π", "😀", "\"", "\\", "/", "\n", "\t", "\u{1}", "<", "&", " ",
];

fn random_text(rng: &mut Lcg) -> String {
    let len = rng.range(8) as usize;
    let mut out = String::new();
    for _ in 0..len {
        out.push_str(ALPHABET[rng.range(ALPHABET.len() as u64) as usize]);
    }
    out
}

// Floats are 64ths so every pick is exactly representable.
fn random_dyadic(rng: &mut Lcg) -> f64 {
    ((rng.range(2_000_001) as f64) - 1_000_000.0) / 64.0
}

fn random_scalar(rng: &mut Lcg) -> Value {
    match rng.range(6) {
        0 => Value::Null,
        1 => Value::Bool(rng.range(2) == 1),
        2 => Value::Number(serde_json::Number::from((rng.range(4000) as i64) - 2000)),
        3 => Value::Number(serde_json::Number::from(rng.next_u64() | (1 << 63))),
        4 => Value::Number(serde_json::Number::from_f64(random_dyadic(rng)).expect("finite")),
        _ => Value::String(random_text(rng)),
    }
}

fn random_value(rng: &mut Lcg, depth: usize) -> Value {
    if depth == 0 {
        return random_scalar(rng);
    }
    match rng.range(4) {
        0 => random_scalar(rng),
        1 => {
            let len = rng.range(4) as usize;
            let mut arr = Vec::with_capacity(len);
            for _ in 0..len {
                arr.push(random_value(rng, depth - 1));
            }
            Value::Array(arr)
        }
        _ => random_object(rng, depth - 1),
    }
}

fn random_object(rng: &mut Lcg, depth: usize) -> Value {
    let len = (1 + rng.range(4)) as usize;
    let mut map = serde_json::Map::new();
    for i in 0..len {
        map.insert(format!("k{}", i), random_value(rng, depth));
    }
    Value::Object(map)
}

fn random_json(seed: u64, depth: usize) -> Value {
    let mut rng = Lcg::new(seed);
    random_object(&mut rng, depth)
}

fn random_tree_scalar(rng: &mut Lcg) -> JsonValue {
    match rng.range(8) {
        0 => JsonValue::Null,
        1 => JsonValue::Bool(rng.range(2) == 1),
        2 => JsonValue::Int((rng.next_u64() as i64) >> (rng.range(40) as u32)),
        3 => JsonValue::UInt(rng.next_u64() | (1 << 63)),
        4 => JsonValue::BigInt(i128::from(rng.next_u64()) + i128::from(u64::MAX) + 1),
        5 => JsonValue::BigInt(-(i128::from(rng.next_u64()) + i128::from(u64::MAX) + 1)),
        6 => JsonValue::Float(random_dyadic(rng)),
        _ => JsonValue::Str(random_text(rng)),
    }
}

fn random_tree_value(rng: &mut Lcg, depth: usize) -> JsonValue {
    if depth == 0 {
        return random_tree_scalar(rng);
    }
    match rng.range(4) {
        0 => random_tree_scalar(rng),
        1 => {
            let len = rng.range(4) as usize;
            let mut arr = Vec::with_capacity(len);
            for _ in 0..len {
                arr.push(random_tree_value(rng, depth - 1));
            }
            JsonValue::Array(arr)
        }
        _ => random_tree_object(rng, depth - 1),
    }
}

fn random_tree_object(rng: &mut Lcg, depth: usize) -> JsonValue {
    let len = (1 + rng.range(4)) as usize;
    JsonValue::Object(
        (0..len)
            .map(|i| (format!("k{}", i), random_tree_value(rng, depth)))
            .collect(),
    )
}

fn random_tree(seed: u64, depth: usize) -> JsonValue {
    let mut rng = Lcg::new(seed);
    random_tree_object(&mut rng, depth)
}
