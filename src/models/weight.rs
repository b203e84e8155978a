use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Largest number of digits before the decimal point (`NUMERIC(6, 2)`).
const MAX_WHOLE_DIGITS: usize = 4;
const MAX_FRACTION_DIGITS: usize = 2;

/// A non-negative load with at most two fractional digits, held as hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight(i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WeightError {
    #[error("weight must be a decimal number")]
    NotANumber,
    #[error("weight must be greater than or equal to 0")]
    Negative,
    #[error("weight must have no more than 2 decimal places")]
    TooManyDecimals,
    #[error("weight must have no more than 6 digits in total")]
    TooManyDigits,
}

impl Weight {
    pub fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub fn hundredths(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl FromStr for Weight {
    type Err = WeightError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty()
            || !is_digits(whole)
            || !is_digits(fraction)
            || (unsigned.contains('.') && fraction.is_empty())
        {
            return Err(WeightError::NotANumber);
        }

        let whole = whole.trim_start_matches('0');
        let fraction = fraction.trim_end_matches('0');

        if negative && !(whole.is_empty() && fraction.is_empty()) {
            return Err(WeightError::Negative);
        }
        if fraction.len() > MAX_FRACTION_DIGITS {
            return Err(WeightError::TooManyDecimals);
        }
        if whole.len() > MAX_WHOLE_DIGITS {
            return Err(WeightError::TooManyDigits);
        }

        // At most four whole and two fraction digits: both parses fit easily.
        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| WeightError::NotANumber)?
        };
        let fraction_value: i64 = format!("{fraction:0<2}")
            .parse()
            .map_err(|_| WeightError::NotANumber)?;

        Ok(Self(whole_value * 100 + fraction_value))
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_two_decimal_places() {
        assert_eq!("100.25".parse::<Weight>(), Ok(Weight(10025)));
        assert_eq!("82.50".parse::<Weight>(), Ok(Weight(8250)));
        assert_eq!("80".parse::<Weight>(), Ok(Weight(8000)));
        assert_eq!("0".parse::<Weight>(), Ok(Weight(0)));
        assert_eq!("9999.99".parse::<Weight>(), Ok(Weight(999_999)));
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        assert_eq!("100.250".parse::<Weight>(), Ok(Weight(10025)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!("-10.5".parse::<Weight>(), Err(WeightError::Negative));
        assert_eq!("100.256".parse::<Weight>(), Err(WeightError::TooManyDecimals));
        assert_eq!("10000".parse::<Weight>(), Err(WeightError::TooManyDigits));
    }

    #[test]
    fn rejects_malformed_text() {
        for raw in ["", "abc", "1.", ".5", "1e3", "+5", "1.2.3"] {
            assert_eq!(raw.parse::<Weight>(), Err(WeightError::NotANumber), "{raw}");
        }
    }

    #[test]
    fn displays_with_two_decimals() {
        assert_eq!(Weight(8250).to_string(), "82.50");
        assert_eq!(Weight(5).to_string(), "0.05");
    }
}
