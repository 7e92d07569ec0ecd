//! Money value object: currency-safe decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A non-negative monetary amount in a single ISO-4217 currency.
///
/// Immutable; every operation returns a new `Money`. Arithmetic across
/// different currencies is rejected rather than silently converted, which is
/// what keeps order totals honest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl ValueObject for Money {}

impl Money {
    /// Create a validated `Money`.
    ///
    /// Fails if the amount is negative or the currency is not a 3-letter
    /// code. The currency is uppercased on success.
    pub fn new(amount: Decimal, currency: &str) -> DomainResult<Self> {
        if amount < Decimal::ZERO {
            return Err(DomainError::validation("money amount cannot be negative"));
        }

        let currency = currency.trim();
        if currency.is_empty() {
            return Err(DomainError::validation("currency cannot be empty"));
        }

        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(
                "currency must be a 3-letter ISO code (e.g. USD, EUR, COP)",
            ));
        }

        Ok(Self {
            amount,
            currency: currency.to_ascii_uppercase(),
        })
    }

    /// Zero amount in the given currency.
    ///
    /// Skips validation on purpose: order totals start from a fixed internal
    /// currency constant, not caller input.
    pub fn zero(currency: &str) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency: currency.to_ascii_uppercase(),
        }
    }

    pub fn usd(amount: Decimal) -> DomainResult<Self> {
        Self::new(amount, "USD")
    }

    pub fn eur(amount: Decimal) -> DomainResult<Self> {
        Self::new(amount, "EUR")
    }

    pub fn cop(amount: Decimal) -> DomainResult<Self> {
        Self::new(amount, "COP")
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    fn ensure_same_currency(&self, other: &Money, op: &str) -> DomainResult<()> {
        if self.currency != other.currency {
            return Err(DomainError::invariant(format!(
                "cannot {op} amounts in different currencies: {} and {}",
                self.currency, other.currency
            )));
        }
        Ok(())
    }

    /// Sum of two amounts in the same currency.
    pub fn add(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other, "add")?;
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Difference of two amounts in the same currency.
    ///
    /// Fails if the result would be negative: money never goes below zero.
    pub fn sub(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other, "subtract")?;
        let result = self.amount - other.amount;
        if result < Decimal::ZERO {
            return Err(DomainError::invariant(
                "subtraction result cannot be negative",
            ));
        }
        Ok(Money {
            amount: result,
            currency: self.currency.clone(),
        })
    }

    /// Multiply by a non-negative factor (e.g. a line quantity).
    pub fn mul(&self, factor: Decimal) -> DomainResult<Money> {
        if factor < Decimal::ZERO {
            return Err(DomainError::validation(
                "cannot multiply money by a negative factor",
            ));
        }
        Ok(Money {
            amount: self.amount * factor,
            currency: self.currency.clone(),
        })
    }

    pub fn is_greater_than(&self, other: &Money) -> DomainResult<bool> {
        self.ensure_same_currency(other, "compare")?;
        Ok(self.amount > other.amount)
    }

    pub fn is_less_than(&self, other: &Money) -> DomainResult<bool> {
        self.ensure_same_currency(other, "compare")?;
        Ok(self.amount < other.amount)
    }
}

impl core::fmt::Display for Money {
    /// `1,234.50 USD` - grouped thousands, two decimal places.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let rounded = self.amount.round_dp(2);
        let text = format!("{rounded:.2}");
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(*c);
        }

        write!(f, "{grouped}.{frac_part} {}", self.currency)
    }
}
