//! Value kinds and decoded values read from the attached process

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker returned for strings that could not be decoded
pub const UNKNOWN_TEXT: &str = "*";

/// Buffer used for string kinds on a direct read
pub const DIRECT_STRING_BUFFER: usize = 32;

/// Buffer used for string kinds reached through a pointer chain
pub const CHAIN_STRING_BUFFER: usize = 64;

/// The closed set of kinds a tracked value can be decoded as.
///
/// Address tables written for older tooling identify kinds by numeric option
/// codes (1 = byte ... 7 = UTF-16, anything else raw), so deserialization
/// accepts either the code or the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "KindRepr", into = "String")]
pub enum ValueKind {
    I8,
    I16,
    I32,
    U64,
    F64,
    Utf8,
    Utf16,
    #[default]
    Raw,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KindRepr {
    Code(i64),
    Name(String),
}

impl TryFrom<KindRepr> for ValueKind {
    type Error = String;

    fn try_from(repr: KindRepr) -> Result<Self, Self::Error> {
        match repr {
            KindRepr::Code(code) => Ok(ValueKind::from_code(code)),
            KindRepr::Name(name) => ValueKind::from_name(&name)
                .ok_or_else(|| format!("unknown value kind '{}'", name)),
        }
    }
}

impl From<ValueKind> for String {
    fn from(kind: ValueKind) -> Self {
        kind.name().to_string()
    }
}

impl ValueKind {
    /// Maps a legacy option code onto a kind
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ValueKind::I8,
            2 => ValueKind::I16,
            3 => ValueKind::I32,
            4 => ValueKind::U64,
            5 => ValueKind::F64,
            6 => ValueKind::Utf8,
            7 => ValueKind::Utf16,
            _ => ValueKind::Raw,
        }
    }

    /// Parses a kind name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.trim().to_ascii_lowercase().as_str() {
            "i8" | "byte" => ValueKind::I8,
            "i16" | "short" => ValueKind::I16,
            "i32" | "int" => ValueKind::I32,
            "u64" | "ulonglong" => ValueKind::U64,
            "f64" | "double" => ValueKind::F64,
            "utf8" | "string" => ValueKind::Utf8,
            "utf16" | "wstring" => ValueKind::Utf16,
            "raw" | "bytes" => ValueKind::Raw,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::U64 => "u64",
            ValueKind::F64 => "f64",
            ValueKind::Utf8 => "utf8",
            ValueKind::Utf16 => "utf16",
            ValueKind::Raw => "raw",
        }
    }

    /// Whether this kind decodes to text
    pub fn is_text(&self) -> bool {
        matches!(self, ValueKind::Utf8 | ValueKind::Utf16)
    }

    /// Size of the buffer a read of this kind uses.
    ///
    /// Numeric and raw kinds read exactly one pointer width; text kinds use a
    /// fixed buffer that is larger when the value sits behind a pointer chain.
    pub fn buffer_len(&self, pointer_width: usize, through_chain: bool) -> usize {
        match (self.is_text(), through_chain) {
            (true, false) => DIRECT_STRING_BUFFER,
            (true, true) => CHAIN_STRING_BUFFER,
            (false, _) => pointer_width,
        }
    }

    /// Decodes a raw buffer as this kind.
    ///
    /// Numeric kinds yield `None` when the buffer is too short; text kinds
    /// yield [`UNKNOWN_TEXT`] on invalid encoding and never fail.
    pub fn decode(&self, bytes: &[u8]) -> Option<Value> {
        match self {
            ValueKind::I8 => bytes.first().map(|&b| Value::I8(b as i8)),
            ValueKind::I16 => fixed::<2>(bytes).map(|raw| Value::I16(i16::from_ne_bytes(raw))),
            ValueKind::I32 => fixed::<4>(bytes).map(|raw| Value::I32(i32::from_ne_bytes(raw))),
            ValueKind::U64 => match fixed::<8>(bytes) {
                Some(raw) => Some(Value::U64(u64::from_ne_bytes(raw))),
                // 32-bit targets read a 4-byte buffer
                None => fixed::<4>(bytes).map(|raw| Value::U64(u32::from_ne_bytes(raw) as u64)),
            },
            ValueKind::F64 => fixed::<8>(bytes).map(|raw| Value::F64(f64::from_ne_bytes(raw))),
            ValueKind::Utf8 => Some(Value::Text(decode_utf8(bytes))),
            ValueKind::Utf16 => Some(Value::Text(decode_utf16(bytes))),
            ValueKind::Raw => Some(Value::Bytes(bytes.to_vec())),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

fn decode_utf8(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    match std::str::from_utf8(&bytes[..end]) {
        Ok(text) => text.to_string(),
        Err(_) => UNKNOWN_TEXT.to_string(),
    }
}

fn decode_utf16(bytes: &[u8]) -> String {
    let mut units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    if units.first() == Some(&0xFEFF) {
        units.remove(0);
    }
    String::from_utf16(&units).unwrap_or_else(|_| UNKNOWN_TEXT.to_string())
}

/// A decoded value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    U64(u64),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns the kind this value was decoded as
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::I8(_) => ValueKind::I8,
            Value::I16(_) => ValueKind::I16,
            Value::I32(_) => ValueKind::I32,
            Value::U64(_) => ValueKind::U64,
            Value::F64(_) => ValueKind::F64,
            Value::Text(_) => ValueKind::Utf8,
            Value::Bytes(_) => ValueKind::Raw,
        }
    }

    /// Integer view of numeric values
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v as i64),
            Value::I16(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::U64(v) => i64::try_from(v).ok(),
            Value::F64(v) if v.is_finite() => Some(v as i64),
            _ => None,
        }
    }

    /// Unsigned view of numeric values; negative values yield `None`
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(v) => Some(v),
            _ => self.as_i64().and_then(|v| u64::try_from(v).ok()),
        }
    }

    /// Text view
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True for text that failed to decode
    pub fn is_unknown_text(&self) -> bool {
        self.as_str() == Some(UNKNOWN_TEXT)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Text(text) => write!(f, "{:?}", text),
            Value::Bytes(bytes) => write!(f, "[{}]", hex::encode(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_code() {
        assert_eq!(ValueKind::from_code(1), ValueKind::I8);
        assert_eq!(ValueKind::from_code(3), ValueKind::I32);
        assert_eq!(ValueKind::from_code(7), ValueKind::Utf16);
        assert_eq!(ValueKind::from_code(0), ValueKind::Raw);
        assert_eq!(ValueKind::from_code(42), ValueKind::Raw);
    }

    #[test]
    fn test_kind_deserializes_from_code_or_name() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: ValueKind,
        }

        let by_code: Wrapper = toml::from_str("kind = 5").unwrap();
        assert_eq!(by_code.kind, ValueKind::F64);

        let by_name: Wrapper = toml::from_str("kind = \"utf16\"").unwrap();
        assert_eq!(by_name.kind, ValueKind::Utf16);

        let alias: Wrapper = toml::from_str("kind = \"Int\"").unwrap();
        assert_eq!(alias.kind, ValueKind::I32);

        assert!(toml::from_str::<Wrapper>("kind = \"quad\"").is_err());
    }

    #[test]
    fn test_buffer_len() {
        assert_eq!(ValueKind::I32.buffer_len(4, false), 4);
        assert_eq!(ValueKind::I8.buffer_len(8, true), 8);
        assert_eq!(ValueKind::Raw.buffer_len(8, false), 8);
        assert_eq!(ValueKind::Utf8.buffer_len(8, false), 32);
        assert_eq!(ValueKind::Utf16.buffer_len(4, true), 64);
    }

    #[test]
    fn test_numeric_decode() {
        let buffer = (-1234i32).to_ne_bytes();
        assert_eq!(ValueKind::I32.decode(&buffer), Some(Value::I32(-1234)));
        assert_eq!(ValueKind::I16.decode(&buffer), Some(Value::I16(-1234)));
        assert_eq!(ValueKind::I8.decode(&[0xFF, 0, 0, 0]), Some(Value::I8(-1)));

        let wide = 0x0102_0304_0506_0708u64.to_ne_bytes();
        assert_eq!(
            ValueKind::U64.decode(&wide),
            Some(Value::U64(0x0102_0304_0506_0708))
        );

        let pi = std::f64::consts::PI.to_ne_bytes();
        assert_eq!(ValueKind::F64.decode(&pi), Some(Value::F64(std::f64::consts::PI)));
    }

    #[test]
    fn test_short_buffers() {
        assert_eq!(ValueKind::I32.decode(&[1, 2]), None);
        assert_eq!(ValueKind::F64.decode(&[0; 4]), None);
        assert_eq!(ValueKind::I8.decode(&[]), None);
        assert_eq!(
            ValueKind::U64.decode(&7u32.to_ne_bytes()),
            Some(Value::U64(7))
        );
    }

    #[test]
    fn test_utf8_decode() {
        let mut buffer = [0u8; 32];
        buffer[..3].copy_from_slice(b"Rat");
        buffer[5] = 0xFF;
        assert_eq!(ValueKind::Utf8.decode(&buffer), Some(Value::Text("Rat".into())));

        let invalid = [0xC3, 0x28, 0x00];
        let value = ValueKind::Utf8.decode(&invalid).unwrap();
        assert!(value.is_unknown_text());
    }

    #[test]
    fn test_utf16_decode() {
        let mut buffer: Vec<u8> = "Dragon Lord"
            .encode_utf16()
            .flat_map(|unit| unit.to_ne_bytes())
            .collect();
        buffer.extend_from_slice(&[0, 0]);
        buffer.extend("junk".encode_utf16().flat_map(|unit| unit.to_ne_bytes()));
        assert_eq!(
            ValueKind::Utf16.decode(&buffer),
            Some(Value::Text("Dragon Lord".into()))
        );

        let lone_surrogate = 0xD800u16.to_ne_bytes();
        let value = ValueKind::Utf16.decode(&lone_surrogate).unwrap();
        assert!(value.is_unknown_text());
    }

    #[test]
    fn test_raw_decode_keeps_bytes() {
        let value = ValueKind::Raw.decode(&[0xDE, 0xAD]).unwrap();
        assert_eq!(value, Value::Bytes(vec![0xDE, 0xAD]));
        assert_eq!(value.to_string(), "[dead]");
    }

    #[test]
    fn test_value_views() {
        assert_eq!(Value::I16(-5).as_i64(), Some(-5));
        assert_eq!(Value::I16(-5).as_u64(), None);
        assert_eq!(Value::U64(u64::MAX).as_i64(), None);
        assert_eq!(Value::U64(9).as_u64(), Some(9));
        assert_eq!(Value::Text("x".into()).as_i64(), None);
        assert_eq!(Value::Text("x".into()).as_str(), Some("x"));
        assert_eq!(Value::I32(3).kind(), ValueKind::I32);
    }
}
