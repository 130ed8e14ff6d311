//! Destination address
//!
//! Accepts both the checkout API shape (`postalCode`, `state`, `city`,
//! `country`) and the order-record shape (`shippingPostalCode`,
//! `shippingState`, ...). Only the postal code and the state take part in
//! tier matching; city and country are carried for completeness checks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A shipping destination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Address {
    #[serde(
        default,
        alias = "postalCode",
        alias = "shippingPostalCode",
        skip_serializing_if = "Option::is_none"
    )]
    pub postal_code: Option<String>,

    /// State or province name
    #[serde(
        default,
        alias = "province",
        alias = "shippingState",
        alias = "shippingProvince",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,

    #[serde(default, alias = "shippingCity", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, alias = "shippingCountry", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Trim every field and drop the ones left empty
    pub fn normalized(&self) -> Address {
        Address {
            postal_code: clean(&self.postal_code),
            state: clean(&self.state),
            city: clean(&self.city),
            country: clean(&self.country),
        }
    }

    /// Postal code usable as a tier key, if any
    pub fn postal_code_key(&self) -> Option<&str> {
        key(&self.postal_code)
    }

    /// State usable as a tier key, if any
    pub fn state_key(&self) -> Option<&str> {
        key(&self.state)
    }

    /// Fields a delivery address must carry that are missing here
    pub fn missing_delivery_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if key(&self.postal_code).is_none() {
            missing.push("postal_code".to_string());
        }
        if key(&self.city).is_none() {
            missing.push("city".to_string());
        }
        if key(&self.country).is_none() {
            missing.push("country".to_string());
        }
        missing
    }
}

fn key(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn clean(field: &Option<String>) -> Option<String> {
    key(field).map(str::to_string)
}
