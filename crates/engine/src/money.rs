use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (balances, salaries,
/// ledger deltas, penalties) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = income / increase
/// - negative = expense / decrease
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Checked multiplication by an integer factor (days, units).
    #[must_use]
    pub fn checked_mul(self, factor: i64) -> Option<MoneyCents> {
        self.0.checked_mul(factor).map(MoneyCents)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s).map(MoneyCents)
    }
}

/// A percentage stored in **basis points** (hundredths of a percent).
///
/// `Percent::from_bp(1000)` is 10.00%. Parses from the same decimal notation
/// as [`MoneyCents`], so `"12.5"` is 1250 bp.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Percent(i64);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const HUNDRED: Percent = Percent(10_000);

    #[must_use]
    pub const fn from_bp(bp: i64) -> Self {
        Self(bp)
    }

    #[must_use]
    pub const fn bp(self) -> i64 {
        self.0
    }

    /// Applies the rate to `amount`, rounding to the cent with round-half-even.
    #[must_use]
    pub fn of(self, amount: MoneyCents) -> MoneyCents {
        let num = i128::from(amount.cents()) * i128::from(self.0);
        let den: i128 = 10_000;
        let mut quotient = num / den;
        let remainder = (num % den).abs();
        let twice = remainder * 2;
        if twice > den || (twice == den && quotient % 2 != 0) {
            quotient += num.signum();
        }
        // Both factors fit in i64 and |rate| <= 100% keeps the result in range.
        MoneyCents(i64::try_from(quotient).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", MoneyCents(self.0))
    }
}

impl FromStr for Percent {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s).map(Percent)
    }
}

fn parse_hundredths(s: &str) -> Result<i64, EngineError> {
    let empty = || EngineError::InvalidInput("empty amount".to_string());
    let invalid = || EngineError::InvalidInput("invalid amount".to_string());
    let overflow = || EngineError::InvalidInput("amount too large".to_string());

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(empty());
    }

    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return Err(empty());
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let units_str = parts.next().ok_or_else(invalid)?;
    let fraction_str = parts.next();

    if parts.next().is_some() {
        return Err(invalid());
    }

    if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let units: i64 = units_str.parse().map_err(|_| overflow())?;

    let hundredths: i64 = match fraction_str {
        None | Some("") => 0,
        Some(frac) => {
            if !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            match frac.len() {
                1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                2 => frac.parse::<i64>().map_err(|_| invalid())?,
                _ => return Err(EngineError::InvalidInput("too many decimals".to_string())),
            }
        }
    };

    let total = units
        .checked_mul(100)
        .and_then(|v| v.checked_add(hundredths))
        .ok_or_else(overflow)?;

    if negative {
        total.checked_neg().ok_or_else(overflow)
    } else {
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<MoneyCents>().unwrap().cents(), 1050);
        assert_eq!("-0.01".parse::<MoneyCents>().unwrap().cents(), -1);
        assert_eq!("+1.00".parse::<MoneyCents>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<MoneyCents>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("0.001".parse::<MoneyCents>().is_err());
        assert!("1.2.3".parse::<MoneyCents>().is_err());
        assert!("abc".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn percent_parses_and_applies() {
        let rate: Percent = "10".parse().unwrap();
        assert_eq!(rate.bp(), 1000);
        assert_eq!(rate.of(MoneyCents::new(310_000)), MoneyCents::new(31_000));
        assert_eq!("12.5".parse::<Percent>().unwrap().to_string(), "12.50%");
    }

    #[test]
    fn percent_rounds_half_to_even() {
        // 5% of 0.10 = 0.005 -> 0.00 (even), 5% of 0.30 = 0.015 -> 0.02 (even)
        let five = Percent::from_bp(500);
        assert_eq!(five.of(MoneyCents::new(10)), MoneyCents::new(0));
        assert_eq!(five.of(MoneyCents::new(30)), MoneyCents::new(2));
        // 1% of 1.99 = 0.0199 -> 0.02
        assert_eq!(Percent::from_bp(100).of(MoneyCents::new(199)), MoneyCents::new(2));
    }

    #[test]
    fn sum_of_amounts() {
        let total: MoneyCents = [100, -30, 5].into_iter().map(MoneyCents::new).sum();
        assert_eq!(total, MoneyCents::new(75));
    }
}
