//! Checkout-facing operations over a rule store
//!
//! - [`ShippingService::get_available_shipping_methods`] lists what the
//!   customer can pick, silently leaving out methods that cannot ship.
//! - [`ShippingService::calculate_shipping_cost`] prices one chosen method.
//! - [`ShippingService::validate_shipping_method`] re-checks a method at
//!   order creation and keeps the reason when it no longer applies.

use crate::address::Address;
use crate::aggregate::{list_available_methods, AvailableMethod};
use crate::error::{Error, Result};
use crate::method::MethodId;
use crate::resolve::{Quote, Resolution, Resolver, ResolverConfig, UnavailableReason};
use crate::store::RuleStore;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Result of re-validating a method before committing an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub valid: bool,

    #[serde(flatten)]
    pub quote: Option<Quote>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnavailableReason>,
}

impl Validation {
    fn valid(quote: Quote) -> Self {
        Self {
            valid: true,
            quote: Some(quote),
            reason: None,
        }
    }

    fn invalid(reason: UnavailableReason) -> Self {
        Self {
            valid: false,
            quote: None,
            reason: Some(reason),
        }
    }
}

/// Shipping operations backed by a [`RuleStore`]
pub struct ShippingService<S> {
    store: S,
    resolver: Resolver,
}

impl<S: RuleStore> ShippingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            resolver: Resolver::with_config(ResolverConfig {
                enforce_enabled: true,
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Enabled methods that can ship to `address`, in display order
    pub fn get_available_shipping_methods(
        &self,
        address: &Address,
        order_subtotal: Decimal,
        is_bulky: bool,
    ) -> Result<Vec<AvailableMethod>> {
        let catalog = self.store.snapshot();
        let address = address.normalized();
        let methods =
            list_available_methods(catalog.enabled(), &address, order_subtotal, is_bulky)?;
        tracing::info!(
            catalog = %catalog.stamp().hash,
            offered = methods.len(),
            "listed shipping methods"
        );
        Ok(methods)
    }

    /// Price one method; rejection is an [`Error::Unavailable`]
    pub fn calculate_shipping_cost(
        &self,
        method_id: MethodId,
        address: &Address,
        order_subtotal: Decimal,
        is_bulky: bool,
    ) -> Result<Quote> {
        match self.resolve(method_id, address, order_subtotal, is_bulky)? {
            Resolution::Quoted(quote) => Ok(quote),
            Resolution::Unavailable(unavailable) => Err(Error::Unavailable(unavailable.reason)),
        }
    }

    /// Check a method is still resolvable, keeping the reason if not
    pub fn validate_shipping_method(
        &self,
        method_id: MethodId,
        address: &Address,
        order_subtotal: Decimal,
        is_bulky: bool,
    ) -> Result<Validation> {
        let validation = match self.resolve(method_id, address, order_subtotal, is_bulky) {
            Ok(Resolution::Quoted(quote)) => Validation::valid(quote),
            Ok(Resolution::Unavailable(unavailable)) => Validation::invalid(unavailable.reason),
            Err(Error::MethodNotFound(_)) => Validation::invalid(UnavailableReason::MethodNotFound),
            Err(e) => return Err(e),
        };

        if !validation.valid {
            tracing::info!(method_id, reason = ?validation.reason, "shipping method failed validation");
        }
        Ok(validation)
    }

    fn resolve(
        &self,
        method_id: MethodId,
        address: &Address,
        order_subtotal: Decimal,
        is_bulky: bool,
    ) -> Result<Resolution> {
        let catalog = self.store.snapshot();
        let method = catalog
            .get(method_id)
            .ok_or_else(|| Error::MethodNotFound(method_id.to_string()))?;
        self.resolver
            .resolve(method, &address.normalized(), order_subtotal, is_bulky)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::method::{RuleSet, ShippingMethod, TierRule};
    use crate::resolve::Tier;
    use crate::store::InMemoryRuleStore;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn service() -> ShippingService<InMemoryRuleStore> {
        let mut express = ShippingMethod::new(2, "express", "Express", dec(2500)).with_rules(
            RuleSet::default().with_province("Santa Fe", TierRule::unavailable()),
        );
        express.display_order = 1;
        let mut standard = ShippingMethod::new(1, "standard", "Standard", dec(1500));
        standard.display_order = 2;
        let pickup = ShippingMethod::new(3, "pickup", "Pickup", dec(0)).disabled();

        ShippingService::new(InMemoryRuleStore::new(Catalog::new(
            vec![standard, express, pickup],
            Vec::new(),
        )))
    }

    #[test]
    fn test_available_in_display_order() {
        let methods = service()
            .get_available_shipping_methods(&Address::new(), dec(100), false)
            .unwrap();
        let ids: Vec<_> = methods.iter().map(|m| m.quote.method.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_available_normalizes_address() {
        let address = Address::new().with_state("  Santa Fe ");
        let methods = service()
            .get_available_shipping_methods(&address, dec(100), false)
            .unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].quote.method.code, "standard");
    }

    #[test]
    fn test_calculate() {
        let service = service();
        let quote = service
            .calculate_shipping_cost(1, &Address::new(), dec(100), false)
            .unwrap();
        assert_eq!(quote.tier, Tier::National);
        assert_eq!(quote.cost, dec(1500));

        let santa_fe = Address::new().with_state("Santa Fe");
        let err = service
            .calculate_shipping_cost(2, &santa_fe, dec(100), false)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Unavailable(UnavailableReason::ProvinceUnavailable)
        ));

        let err = service
            .calculate_shipping_cost(3, &Address::new(), dec(100), false)
            .unwrap_err();
        assert!(matches!(err, Error::Unavailable(UnavailableReason::MethodDisabled)));

        let err = service
            .calculate_shipping_cost(99, &Address::new(), dec(100), false)
            .unwrap_err();
        assert!(matches!(err, Error::MethodNotFound(_)));
    }

    #[test]
    fn test_validate_keeps_reason() {
        let service = service();
        let santa_fe = Address::new().with_state("Santa Fe");

        let invalid = service
            .validate_shipping_method(2, &santa_fe, dec(100), false)
            .unwrap();
        assert!(!invalid.valid);
        assert_eq!(invalid.reason, Some(UnavailableReason::ProvinceUnavailable));

        let missing = service
            .validate_shipping_method(99, &santa_fe, dec(100), false)
            .unwrap();
        assert_eq!(missing.reason, Some(UnavailableReason::MethodNotFound));

        let valid = service
            .validate_shipping_method(1, &santa_fe, dec(100), false)
            .unwrap();
        assert!(valid.valid);
        assert_eq!(valid.quote.unwrap().cost, dec(1500));
    }

    #[test]
    fn test_validate_surfaces_contract_violation() {
        let err = service()
            .validate_shipping_method(1, &Address::new(), dec(-1), false)
            .unwrap_err();
        assert!(matches!(err, Error::Contract(_)));
    }

    #[test]
    fn test_validation_json_shape() {
        let service = service();
        let valid = service
            .validate_shipping_method(1, &Address::new(), dec(100), false)
            .unwrap();
        let json = serde_json::to_value(&valid).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["tier"], "national");
        assert!(json.get("reason").is_none());

        let invalid = service
            .validate_shipping_method(99, &Address::new(), dec(100), false)
            .unwrap();
        let json = serde_json::to_value(&invalid).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["reason"], "method_not_found");
    }
}
