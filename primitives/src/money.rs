use std::{fmt, iter::Sum, ops::Add};

use serde::{Deserialize, Serialize};

/// Fixed-point money amount, stored in the currency's minor unit (precision 2).
///
/// All arithmetic the delivery path performs on prices stays in integer minor
/// units, which keeps auction weights exact.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const PRECISION: usize = 2;

    pub const ZERO: Money = Money(0);

    pub fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Builds an amount from whole currency units, `None` on overflow.
    pub fn from_whole(whole: u64) -> Option<Self> {
        whole.checked_mul(10_u64.pow(Self::PRECISION as u32)).map(Self)
    }

    pub fn to_minor(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: u64) -> Option<Money> {
        self.0.checked_mul(rhs).map(Self)
    }
}

impl From<u64> for Money {
    fn from(minor: u64) -> Self {
        Self(minor)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut string_value = self.0.to_string();
        let value_length = string_value.len();

        if value_length > Self::PRECISION {
            string_value.insert(value_length - Self::PRECISION, '.');

            f.write_str(&string_value)
        } else {
            write!(f, "0.{:0>2}", string_value)
        }
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({})", self)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Money(iter.map(|amount| amount.0).sum())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn formats_with_minor_unit_precision() {
        assert_eq!("0.00", Money::ZERO.to_string());
        assert_eq!("0.04", Money::from_minor(4).to_string());
        assert_eq!("0.40", Money::from_minor(40).to_string());
        assert_eq!("1.23", Money::from_minor(123).to_string());
        assert_eq!("1000.00", Money::from_minor(100_000).to_string());
    }

    #[test]
    fn whole_units_and_checked_arithmetic() {
        let four_cents = Money::from_minor(4);
        let one_euro = Money::from_whole(1).expect("Should fit");

        assert_eq!(Money::from_minor(100), one_euro);
        assert_eq!(Some(Money::from_minor(104)), one_euro.checked_add(four_cents));
        assert_eq!(None, four_cents.checked_sub(one_euro));
        assert_eq!(None, Money::from_minor(u64::MAX).checked_mul(2));
        assert_eq!(None, Money::from_whole(u64::MAX));
    }

    #[test]
    fn serializes_as_bare_minor_units() {
        let amount = Money::from_minor(123);

        let json = serde_json::to_value(amount).expect("Should serialize");
        assert_eq!(serde_json::json!(123), json);

        let back: Money = serde_json::from_value(json).expect("Should deserialize");
        assert_eq!(amount, back);
    }
}
