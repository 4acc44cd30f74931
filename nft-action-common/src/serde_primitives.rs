//! Serde helpers for values that leave the kit as plain data.
//!
//! Large integers are always rendered as decimal strings so consumers never need an unbounded
//! integer type to read them back.
use alloy_primitives::U256;
use serde::{de, Deserialize, Deserializer, Serializer};

/// Parses a strictly decimal, unsigned integer that fits into 256 bits.
///
/// Unlike `U256::from_str` this rejects empty input, signs and `0x` prefixed values.
pub fn parse_decimal_u256(value: &str) -> Option<U256> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(value, 10).ok()
}

/// Parses an unsigned hexadecimal integer with an optional `0x` prefix.
pub fn parse_hex_u256(value: &str) -> Option<U256> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() || digits.len() > 64 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

pub mod u256_decimal {
    use super::*;

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_decimal_u256(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid decimal integer: {raw}")))
    }
}

pub mod u256_decimal_option {
    use super::*;

    pub fn serialize<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                parse_decimal_u256(&raw)
                    .ok_or_else(|| de::Error::custom(format!("invalid decimal integer: {raw}")))
            })
            .transpose()
    }
}
