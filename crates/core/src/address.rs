//! Postal address value object.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A validated, normalized shipping address.
///
/// All fields required. Immutable: replacing an address means constructing a
/// new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    city: String,
    state: String,
    postal_code: String,
    country: String,
}

impl ValueObject for Address {}

impl Address {
    /// Create a validated address.
    ///
    /// Fails if any field is blank. All fields are trimmed; state and
    /// country are uppercased.
    pub fn new(
        street: &str,
        city: &str,
        state: &str,
        postal_code: &str,
        country: &str,
    ) -> DomainResult<Self> {
        let require = |value: &str, field: &str| -> DomainResult<String> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(DomainError::validation(format!("{field} cannot be empty")));
            }
            Ok(trimmed.to_string())
        };

        Ok(Self {
            street: require(street, "street")?,
            city: require(city, "city")?,
            state: require(state, "state")?.to_uppercase(),
            postal_code: require(postal_code, "postal code")?,
            country: require(country, "country")?.to_uppercase(),
        })
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Single-line rendering of the full address.
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}",
            self.street, self.city, self.state, self.postal_code, self.country
        )
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.full_address())
    }
}
