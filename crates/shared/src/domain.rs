use std::{fmt, str::FromStr};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! hex_string_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

// Base-layer account as reported by the wallet.
hex_string_newtype!(EthAddress);
// Rollup-native short address derived from an `EthAddress`.
hex_string_newtype!(ShortAddress);
// Not validated: attach accepts whatever the user typed, trimmed.
hex_string_newtype!(ContractAddress);
hex_string_newtype!(TxHash);

#[derive(Debug, Error, PartialEq)]
pub enum HexFieldError {
    #[error("missing 0x prefix in '{0}'")]
    MissingPrefix(String),
    #[error("invalid hex in '{value}': {source}")]
    InvalidHex {
        value: String,
        source: hex::FromHexError,
    },
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

pub fn decode_prefixed_hex(raw: &str) -> Result<Vec<u8>, HexFieldError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| HexFieldError::MissingPrefix(raw.to_string()))?;
    hex::decode(digits).map_err(|source| HexFieldError::InvalidHex {
        value: raw.to_string(),
        source,
    })
}

pub fn decode_fixed_hex<const N: usize>(raw: &str) -> Result<[u8; N], HexFieldError> {
    let bytes = decode_prefixed_hex(raw)?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| HexFieldError::WrongLength {
        expected: N,
        actual,
    })
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityParseError {
    #[error("quantity '{0}' is missing the 0x prefix")]
    MissingPrefix(String),
    #[error("quantity '{0}' has no digits")]
    Empty(String),
    #[error("quantity '{0}' is not a valid number")]
    Invalid(String),
}

/// Arbitrary-precision unsigned chain quantity (balances, uint256 words).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(BigUint);

impl Quantity {
    /// Parses a JSON-RPC hex quantity (`0x1a`) or a 32-byte ABI word.
    pub fn from_hex_str(raw: &str) -> Result<Self, QuantityParseError> {
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| QuantityParseError::MissingPrefix(raw.to_string()))?;
        if digits.is_empty() {
            return Err(QuantityParseError::Empty(raw.to_string()));
        }
        BigUint::parse_bytes(digits.as_bytes(), 16)
            .map(Self)
            .ok_or_else(|| QuantityParseError::Invalid(raw.to_string()))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }

    /// Integer division by `10^exponent`, truncating toward zero.
    pub fn div_pow10(&self, exponent: u32) -> Self {
        let divisor = BigUint::from(10u32).pow(exponent);
        Self(&self.0 / divisor)
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl FromStr for Quantity {
    type Err = QuantityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") || s.starts_with("0X") {
            return Self::from_hex_str(s);
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| QuantityParseError::Invalid(s.to_string()))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value typed into the "new stored value" input.
///
/// Parsing never fails: text that is not a base-10 integer becomes
/// `NotANumber` and is carried downstream unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericInput {
    #[default]
    Unset,
    Number(i64),
    NotANumber,
}

impl NumericInput {
    pub fn parse(text: &str) -> Self {
        match text.trim().parse::<i64>() {
            Ok(value) => Self::Number(value),
            Err(_) => Self::NotANumber,
        }
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => Ok(()),
            Self::Number(value) => write!(f, "{value}"),
            Self::NotANumber => f.write_str("NaN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rpc_hex_quantities() {
        assert_eq!(Quantity::from_hex_str("0x0").expect("zero"), Quantity::from(0));
        assert_eq!(
            Quantity::from_hex_str("0x49504f80").expect("balance"),
            Quantity::from(1_230_000_000)
        );
        assert_eq!(
            Quantity::from_hex_str(
                "0x000000000000000000000000000000000000000000000000000000000000007b"
            )
            .expect("abi word"),
            Quantity::from(123)
        );
    }

    #[test]
    fn rejects_empty_and_unprefixed_quantities() {
        assert!(matches!(
            Quantity::from_hex_str("0x"),
            Err(QuantityParseError::Empty(_))
        ));
        assert!(matches!(
            Quantity::from_hex_str("7b"),
            Err(QuantityParseError::MissingPrefix(_))
        ));
        assert!(matches!(
            Quantity::from_hex_str("0xzz"),
            Err(QuantityParseError::Invalid(_))
        ));
    }

    #[test]
    fn keeps_precision_beyond_u64() {
        let huge: Quantity = "123456789012345678901234567890".parse().expect("decimal");
        assert_eq!(huge.to_string(), "123456789012345678901234567890");
        assert_eq!(huge.div_pow10(8).to_string(), "1234567890123456789012");
    }

    #[test]
    fn numeric_input_follows_base10_integer_parsing() {
        assert_eq!(NumericInput::parse("42"), NumericInput::Number(42));
        assert_eq!(NumericInput::parse(" -7 "), NumericInput::Number(-7));
        assert_eq!(NumericInput::parse("12a"), NumericInput::NotANumber);
        assert_eq!(NumericInput::parse(""), NumericInput::NotANumber);
        assert_eq!(
            NumericInput::parse("99999999999999999999"),
            NumericInput::NotANumber
        );
        assert_eq!(NumericInput::NotANumber.to_string(), "NaN");
        assert_eq!(NumericInput::default().to_string(), "");
    }

    #[test]
    fn decodes_fixed_width_hex() {
        let bytes: [u8; 2] = decode_fixed_hex("0xabcd").expect("two bytes");
        assert_eq!(bytes, [0xab, 0xcd]);
        assert_eq!(
            decode_fixed_hex::<3>("0xabcd"),
            Err(HexFieldError::WrongLength {
                expected: 3,
                actual: 2
            })
        );
        assert!(matches!(
            decode_fixed_hex::<2>("abcd"),
            Err(HexFieldError::MissingPrefix(_))
        ));
    }
}
