//! Shipping method records: the core data model
//!
//! A `ShippingMethod` carries a national base cost and an optional
//! `RuleSet` describing the cascade:
//!
//! ```yaml
//! id: 1
//! code: correo_standard
//! name: "Correo Argentino Estándar"
//! base_cost: 15000
//! estimated_days_min: 3
//! estimated_days_max: 7
//! rules:
//!   postal_codes:
//!     "B8000": { cost: 0 }
//!     "7500": { cost: 5000 }
//!     "9400": { available: false }
//!   provinces:
//!     "Buenos Aires": { cost: 8000 }
//!     "Santa Fe": { available: false }
//!   bulky_extra: 800
//!   free_shipping_threshold: 50000
//! ```
//!
//! The camelCase names of the persisted record (`baseCost`,
//! `postalCodes`, `freeShippingThreshold`, ...) are accepted too.

use crate::error::{ContractViolation, Error, Result};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Shipping method identifier
pub type MethodId = u64;

/// A shipping method as configured by the store admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Shipping Method", description = "Shipping method with cascade rules")]
pub struct ShippingMethod {
    pub id: MethodId,

    /// Unique short identifier, e.g. `standard`
    pub code: String,

    /// Display name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, alias = "carrierName", skip_serializing_if = "Option::is_none")]
    pub carrier_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// National fallback cost (tier 3)
    #[serde(alias = "baseCost")]
    pub base_cost: Decimal,

    #[serde(default, alias = "estimatedDaysMin", skip_serializing_if = "Option::is_none")]
    pub estimated_days_min: Option<u32>,

    #[serde(default, alias = "estimatedDaysMax", skip_serializing_if = "Option::is_none")]
    pub estimated_days_max: Option<u32>,

    /// Listing position, ascending
    #[serde(default, alias = "displayOrder")]
    pub display_order: i32,

    /// Require postal code, city and country before pricing
    #[serde(default, alias = "requiresAddress")]
    pub requires_address: bool,

    #[serde(default, alias = "allowCashOnDelivery")]
    pub allow_cash_on_delivery: bool,

    /// Cascade rules; absent means "always the base cost"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleSet>,
}

fn default_true() -> bool {
    true
}

/// Cascade rules embedded in a shipping method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleSet {
    /// Subtotal at or above which shipping is free (tier 0)
    #[serde(
        default,
        alias = "freeShippingThreshold",
        skip_serializing_if = "Option::is_none"
    )]
    pub free_shipping_threshold: Option<Decimal>,

    /// Surcharge added for bulky orders
    #[serde(default, alias = "bulkyExtra", skip_serializing_if = "Option::is_none")]
    pub bulky_extra: Option<Decimal>,

    /// Postal code → rule (tier 1, exact match)
    #[serde(
        default,
        alias = "postalCodes",
        deserialize_with = "null_as_empty",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    #[schemars(with = "BTreeMap<String, TierRule>")]
    pub postal_codes: BTreeMap<String, TierRule>,

    /// Province/state name → rule (tier 2, exact match)
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    #[schemars(with = "BTreeMap<String, TierRule>")]
    pub provinces: BTreeMap<String, TierRule>,
}

/// Cost and availability for one postal code or province
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TierRule {
    #[serde(default)]
    pub cost: Decimal,

    #[serde(default = "default_true")]
    pub available: bool,
}

impl TierRule {
    pub fn cost(cost: Decimal) -> Self {
        Self {
            cost,
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            cost: Decimal::ZERO,
            available: false,
        }
    }
}

/// A `null` sub-map means "no rule at this tier"
fn null_as_empty<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, TierRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = Option::<BTreeMap<String, TierRule>>::deserialize(deserializer)?;
    Ok(map.unwrap_or_default())
}

impl ShippingMethod {
    pub fn new(
        id: MethodId,
        code: impl Into<String>,
        name: impl Into<String>,
        base_cost: Decimal,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            description: None,
            carrier_name: None,
            icon: None,
            enabled: true,
            base_cost,
            estimated_days_min: None,
            estimated_days_max: None,
            display_order: 0,
            requires_address: false,
            allow_cash_on_delivery: false,
            rules: None,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_estimate(mut self, min: u32, max: u32) -> Self {
        self.estimated_days_min = Some(min);
        self.estimated_days_max = Some(max);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Parse method from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::CatalogParse(e.to_string()))
    }

    /// Serialize method to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::CatalogParse(e.to_string()))
    }

    /// Parse method from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::CatalogParse(e.to_string()))
    }

    /// Serialize method to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::CatalogParse(e.to_string()))
    }

    /// Rules, or an empty set when none are configured
    pub fn rule_set(&self) -> std::borrow::Cow<'_, RuleSet> {
        match &self.rules {
            Some(rules) => std::borrow::Cow::Borrowed(rules),
            None => std::borrow::Cow::Owned(RuleSet::default()),
        }
    }

    /// Reject records the resolver cannot price
    ///
    /// Covers the fields every resolution reads: the base cost, threshold
    /// and surcharge must be non-negative and the delivery estimate must
    /// not be inverted. Tier entries are checked one at a time by the
    /// resolver when they match, and all at once by [`Self::check_entries`].
    pub fn check_contract(&self) -> std::result::Result<(), ContractViolation> {
        if is_negative(self.base_cost) {
            return Err(self.negative("base_cost".into()));
        }

        if let (Some(min), Some(max)) = (self.estimated_days_min, self.estimated_days_max) {
            if min > max {
                return Err(ContractViolation::InvertedEstimate {
                    code: self.code.clone(),
                    min,
                    max,
                });
            }
        }

        let Some(rules) = &self.rules else {
            return Ok(());
        };

        if rules.free_shipping_threshold.is_some_and(is_negative) {
            return Err(self.negative("free_shipping_threshold".into()));
        }
        if rules.bulky_extra.is_some_and(is_negative) {
            return Err(self.negative("bulky_extra".into()));
        }

        Ok(())
    }

    /// Every postal code and province entry with a negative cost
    pub fn check_entries(&self) -> Vec<ContractViolation> {
        let Some(rules) = &self.rules else {
            return Vec::new();
        };

        let postal = rules
            .postal_codes
            .iter()
            .filter(|(_, rule)| is_negative(rule.cost))
            .map(|(key, _)| self.negative(format!("postal_codes[{}].cost", key)));
        let provinces = rules
            .provinces
            .iter()
            .filter(|(_, rule)| is_negative(rule.cost))
            .map(|(key, _)| self.negative(format!("provinces[{}].cost", key)));

        postal.chain(provinces).collect()
    }

    pub(crate) fn negative(&self, field: String) -> ContractViolation {
        ContractViolation::NegativeAmount {
            code: self.code.clone(),
            field,
        }
    }
}

impl RuleSet {
    pub fn with_postal_code(mut self, code: impl Into<String>, rule: TierRule) -> Self {
        self.postal_codes.insert(code.into(), rule);
        self
    }

    pub fn with_province(mut self, name: impl Into<String>, rule: TierRule) -> Self {
        self.provinces.insert(name.into(), rule);
        self
    }

    pub fn with_free_shipping_threshold(mut self, threshold: Decimal) -> Self {
        self.free_shipping_threshold = Some(threshold);
        self
    }

    pub fn with_bulky_extra(mut self, extra: Decimal) -> Self {
        self.bulky_extra = Some(extra);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.free_shipping_threshold.is_none()
            && self.bulky_extra.is_none()
            && self.postal_codes.is_empty()
            && self.provinces.is_empty()
    }

    /// Keep only provinces present in `canonical`
    ///
    /// Used when importing admin input: misspelled or foreign province
    /// names are dropped instead of silently never matching. Returns the
    /// names that were removed.
    pub fn retain_canonical_provinces(&mut self, canonical: &[String]) -> Vec<String> {
        let mut dropped = Vec::new();
        self.provinces.retain(|name, _| {
            let keep = canonical.iter().any(|c| c == name);
            if !keep {
                dropped.push(name.clone());
            }
            keep
        });
        dropped
    }
}

fn is_negative(amount: Decimal) -> bool {
    amount < Decimal::ZERO
}
