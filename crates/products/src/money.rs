//! Exact monetary amounts.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;

use catalog_core::ValueObject;

/// Exact rational amount of money.
///
/// Always held in reduced form; equality compares values, so `1000/100`
/// equals `10/1`. There is no floating point anywhere in its arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Money {
    amount: BigRational,
}

impl ValueObject for Money {}

impl Money {
    /// Build from a numerator/denominator pair.
    ///
    /// A zero denominator is treated as one.
    pub fn new(numerator: i64, denominator: i64) -> Self {
        let denominator = if denominator == 0 { 1 } else { denominator };
        Self {
            amount: BigRational::new(BigInt::from(numerator), BigInt::from(denominator)),
        }
    }

    pub fn zero() -> Self {
        Self {
            amount: BigRational::zero(),
        }
    }

    pub fn amount(&self) -> &BigRational {
        &self.amount
    }

    /// Numerator of the reduced form.
    pub fn numerator(&self) -> &BigInt {
        self.amount.numer()
    }

    /// Denominator of the reduced form (always positive).
    pub fn denominator(&self) -> &BigInt {
        self.amount.denom()
    }

    /// Reduced numerator/denominator as `i64`s, if both fit.
    pub fn to_i64_parts(&self) -> Option<(i64, i64)> {
        Some((self.numerator().to_i64()?, self.denominator().to_i64()?))
    }

    pub fn is_positive(&self) -> bool {
        self.amount.is_positive()
    }

    /// `percentage`% of this amount, computed exactly.
    pub fn percent_of(&self, percentage: Decimal) -> Money {
        let fraction = decimal_to_rational(percentage) / BigRational::from_integer(BigInt::from(100));
        Money {
            amount: &self.amount * fraction,
        }
    }

    pub fn minus(&self, other: &Money) -> Money {
        Money {
            amount: &self.amount - &other.amount,
        }
    }
}

impl core::fmt::Display for Money {
    /// Two-decimal rendering; the exact value is rounded half away from zero.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let hundred = BigInt::from(100);
        let cents = (&self.amount * BigRational::from_integer(hundred.clone()))
            .round()
            .to_integer();

        let sign = if cents.is_negative() { "-" } else { "" };
        let abs = cents.abs();
        let whole = &abs / &hundred;
        let frac = (&abs % &hundred).to_u32().unwrap_or_default();

        write!(f, "{sign}{whole}.{frac:02}")
    }
}

/// Exact rational value of a decimal.
pub(crate) fn decimal_to_rational(value: Decimal) -> BigRational {
    let denominator = num_traits::pow(BigInt::from(10), value.scale() as usize);
    BigRational::new(BigInt::from(value.mantissa()), denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reports_reduced_parts() {
        let m = Money::new(1999, 100);
        assert_eq!(m.numerator(), &BigInt::from(1999));
        assert_eq!(m.denominator(), &BigInt::from(100));
        assert_eq!(m.to_string(), "19.99");

        let m = Money::new(1000, 100);
        assert_eq!(m.to_i64_parts(), Some((10, 1)));
    }

    #[test]
    fn equality_is_on_value() {
        assert_eq!(Money::new(1000, 100), Money::new(10, 1));
        assert_ne!(Money::new(1000, 100), Money::new(2000, 100));
        assert_eq!(Money::new(-5, -10), Money::new(1, 2));
    }

    #[test]
    fn zero_denominator_is_normalized() {
        let m = Money::new(100, 0);
        assert_eq!(m.denominator(), &BigInt::from(1));
        assert_eq!(m, Money::new(100, 1));
    }

    #[test]
    fn display_rounds_exactly() {
        assert_eq!(Money::new(1, 3).to_string(), "0.33");
        assert_eq!(Money::new(2, 3).to_string(), "0.67");
        assert_eq!(Money::new(1, 200).to_string(), "0.01");
        assert_eq!(Money::new(-1999, 100).to_string(), "-19.99");
        assert_eq!(Money::new(5, 1).to_string(), "5.00");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn percent_of_is_exact() {
        let base = Money::new(1999, 100);
        let off = base.percent_of(Decimal::new(20, 0));
        assert_eq!(off, Money::new(3998, 1000));
        assert_eq!(base.minus(&off).to_string(), "15.99");

        let off = Money::new(10, 1).percent_of(Decimal::new(125, 1));
        assert_eq!(off, Money::new(5, 4));
    }

    #[test]
    fn positivity() {
        assert!(Money::new(1, 100).is_positive());
        assert!(!Money::new(0, 1).is_positive());
        assert!(!Money::new(-1, 1).is_positive());
        assert!(!Money::new(1, -1).is_positive());
    }

    proptest! {
        /// Property: a zero denominator behaves exactly like a denominator of one.
        #[test]
        fn zero_denominator_behaves_as_one(num in any::<i64>()) {
            prop_assert_eq!(Money::new(num, 0), Money::new(num, 1));
            prop_assert_eq!(Money::new(num, 0).to_string(), Money::new(num, 1).to_string());
        }

        /// Property: scaling numerator and denominator never changes the value.
        #[test]
        fn equality_ignores_representation(
            num in -1_000_000i64..1_000_000,
            den in 1i64..10_000,
            k in 1i64..1_000
        ) {
            prop_assert_eq!(Money::new(num, den), Money::new(num * k, den * k));
        }
    }
}
