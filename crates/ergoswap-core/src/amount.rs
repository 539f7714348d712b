use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Maximum number of fractional digits an amount carries
pub const MAX_SCALE: u8 = 18;

/// A non-negative decimal amount in human units.
///
/// Stored as `mantissa / 10^scale`. Two amounts compare by value, so
/// `1.50` equals `1.5`.
#[derive(Clone, Copy, Default)]
pub struct Amount {
    mantissa: u128,
    scale: u8,
}

fn pow10(exp: u32) -> Result<u128, CoreError> {
    10u128.checked_pow(exp).ok_or(CoreError::Overflow)
}

impl Amount {
    pub const ZERO: Amount = Amount { mantissa: 0, scale: 0 };

    /// Build an amount from base units of an asset with `decimals` digits.
    /// Digits beyond `MAX_SCALE` are truncated.
    pub fn from_fractions(fractions: u128, decimals: u8) -> Self {
        if decimals <= MAX_SCALE {
            return Amount { mantissa: fractions, scale: decimals };
        }
        let drop = u32::from(decimals - MAX_SCALE);
        let mantissa = match 10u128.checked_pow(drop) {
            Some(div) => fractions / div,
            None => 0,
        };
        Amount { mantissa, scale: MAX_SCALE }
    }

    /// Parse user input such as `"10"`, `"0.25"` or `".5"`.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(CoreError::InvalidAmount(input.to_string()));
        }

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(CoreError::InvalidAmount(input.to_string()));
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(CoreError::InvalidAmount(input.to_string()));
        }
        if frac_part.len() > MAX_SCALE as usize {
            return Err(CoreError::ScaleTooLarge {
                got: frac_part.len(),
                max: MAX_SCALE,
            });
        }

        let mut mantissa: u128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(b - b'0')))
                .ok_or(CoreError::Overflow)?;
        }

        Ok(Amount {
            mantissa,
            scale: frac_part.len() as u8,
        })
    }

    /// Convert to base units of an asset with `decimals` digits, truncating
    /// any digits the asset cannot encode.
    pub fn to_fractions(&self, decimals: u8) -> Result<u128, CoreError> {
        if self.scale <= decimals {
            let mul = pow10(u32::from(decimals - self.scale))?;
            self.mantissa.checked_mul(mul).ok_or(CoreError::Overflow)
        } else {
            let div = pow10(u32::from(self.scale - decimals))?;
            Ok(self.mantissa / div)
        }
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        let scale = self.scale.max(other.scale);
        let a = self.to_fractions(scale).ok()?;
        let b = other.to_fractions(scale).ok()?;
        Some(Amount {
            mantissa: a.checked_add(b)?,
            scale,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    fn split(&self) -> (u128, u128) {
        // scale <= MAX_SCALE, so the power always fits
        let div = 10u128.pow(u32::from(self.scale));
        (self.mantissa / div, self.mantissa % div)
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        let (int_a, frac_a) = self.split();
        let (int_b, frac_b) = other.split();
        int_a.cmp(&int_b).then_with(|| {
            let scale = self.scale.max(other.scale);
            let fa = frac_a * 10u128.pow(u32::from(scale - self.scale));
            let fb = frac_b * 10u128.pow(u32::from(scale - other.scale));
            fa.cmp(&fb)
        })
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (int, frac) = self.split();
        if frac == 0 {
            return write!(f, "{}", int);
        }
        let digits = format!("{:0width$}", frac, width = self.scale as usize);
        write!(f, "{}.{}", int, digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self)
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::parse(&s).map_err(D::Error::custom)
    }
}

/// Amount as held by an amount input: the numeric value plus the text shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub value: Amount,
    pub view_value: String,
}

impl TokenAmount {
    /// Accept raw user input. Malformed input is rejected here so it never
    /// reaches the form state.
    pub fn from_input(input: &str) -> Result<Self, CoreError> {
        let value = Amount::parse(input)?;
        Ok(TokenAmount {
            value,
            view_value: input.trim().to_string(),
        })
    }

    /// Wrap a derived value, rendering it canonically
    pub fn from_value(value: Amount) -> Self {
        TokenAmount {
            value,
            view_value: value.to_string(),
        }
    }
}

impl From<Amount> for TokenAmount {
    fn from(value: Amount) -> Self {
        TokenAmount::from_value(value)
    }
}
