//! Cascade resolution: price one shipping method for one address
//!
//! Tiers are tried in strict order and the first decision wins:
//!
//! | Tier | When | Cost |
//! |------|------|------|
//! | `free_shipping` | subtotal >= threshold | 0 |
//! | `postal_code` | exact postal code entry | entry cost |
//! | `province` | exact province entry | entry cost |
//! | `national` | nothing matched | base cost |
//!
//! A matched postal code or province entry marked `available: false`
//! rejects the method outright; lower tiers are not consulted. The bulky
//! surcharge is added to every tier except free shipping.
//!
//! Resolution is a pure function of its arguments.

use crate::address::Address;
use crate::error::{ContractViolation, Result};
use crate::method::{MethodId, ShippingMethod, TierRule};
use crate::money::round2;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Price `method` for `address` with the default resolver
pub fn resolve_shipping_cost(
    method: &ShippingMethod,
    address: &Address,
    order_subtotal: Decimal,
    is_bulky: bool,
) -> Result<Resolution> {
    Resolver::new().resolve(method, address, order_subtotal, is_bulky)
}

/// Cascade resolver
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

/// Resolver configuration
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Reject disabled methods instead of trusting the caller to filter them
    pub enforce_enabled: bool,
}

/// The tier a cost was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    FreeShipping,
    PostalCode,
    Province,
    National,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::FreeShipping => write!(f, "free_shipping"),
            Tier::PostalCode => write!(f, "postal_code"),
            Tier::Province => write!(f, "province"),
            Tier::National => write!(f, "national"),
        }
    }
}

/// Why a method cannot be offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    PostalCodeUnavailable,
    ProvinceUnavailable,
    MethodDisabled,
    MethodNotFound,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::PostalCodeUnavailable => write!(f, "postal_code_unavailable"),
            UnavailableReason::ProvinceUnavailable => write!(f, "province_unavailable"),
            UnavailableReason::MethodDisabled => write!(f, "method_disabled"),
            UnavailableReason::MethodNotFound => write!(f, "method_not_found"),
        }
    }
}

/// Outcome of resolving one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Quoted(Quote),
    Unavailable(Unavailable),
}

/// A priced shipping method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Quote {
    /// Final cost, rounded to two decimals
    pub cost: Decimal,
    pub tier: Tier,
    pub free_shipping: bool,
    /// The method's national base cost
    pub original_cost: Decimal,
    pub breakdown: Breakdown,
    pub estimated_days: EstimatedDays,
    pub method: MethodRef,
}

/// Components of the final cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Breakdown {
    /// Cost of the resolved tier
    pub base: Decimal,
    /// Surcharge applied, zero when none
    pub bulky_extra: Decimal,
}

/// Delivery estimate, passed through from the method record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EstimatedDays {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// Identity of the priced method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MethodRef {
    pub id: MethodId,
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_name: Option<String>,
}

/// A method rejected for an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Unavailable {
    pub method_id: MethodId,
    pub code: String,
    pub reason: UnavailableReason,
}

/// Internal tier decision before the surcharge
enum Decision {
    Free,
    Paid { tier: Tier, cost: Decimal },
    Rejected(UnavailableReason),
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn resolve(
        &self,
        method: &ShippingMethod,
        address: &Address,
        order_subtotal: Decimal,
        is_bulky: bool,
    ) -> Result<Resolution> {
        check_request(method, address, order_subtotal)?;

        if self.config.enforce_enabled && !method.enabled {
            return Ok(unavailable(method, UnavailableReason::MethodDisabled));
        }

        let rules = method.rule_set();
        let decision = decide(method, &rules, address, order_subtotal)?;

        let quote = match decision {
            Decision::Rejected(reason) => {
                tracing::debug!(method = %method.code, %reason, "method rejected");
                return Ok(unavailable(method, reason));
            }
            Decision::Free => Quote {
                cost: Decimal::ZERO,
                tier: Tier::FreeShipping,
                free_shipping: true,
                original_cost: round2(method.base_cost),
                breakdown: Breakdown {
                    base: Decimal::ZERO,
                    bulky_extra: Decimal::ZERO,
                },
                estimated_days: estimate(method),
                method: method_ref(method),
            },
            Decision::Paid { tier, cost } => {
                let extra = match rules.bulky_extra {
                    Some(extra) if is_bulky => extra,
                    _ => Decimal::ZERO,
                };
                let total = cost
                    .checked_add(extra)
                    .ok_or_else(|| ContractViolation::AmountOverflow {
                        code: method.code.clone(),
                    })?;
                Quote {
                    cost: round2(total),
                    tier,
                    free_shipping: false,
                    original_cost: round2(method.base_cost),
                    breakdown: Breakdown {
                        base: round2(cost),
                        bulky_extra: round2(extra),
                    },
                    estimated_days: estimate(method),
                    method: method_ref(method),
                }
            }
        };

        tracing::debug!(method = %method.code, tier = %quote.tier, cost = %quote.cost, "method quoted");
        Ok(Resolution::Quoted(quote))
    }
}

/// Walk the tiers; the first match decides
fn decide(
    method: &ShippingMethod,
    rules: &crate::method::RuleSet,
    address: &Address,
    order_subtotal: Decimal,
) -> std::result::Result<Decision, ContractViolation> {
    if let Some(threshold) = rules.free_shipping_threshold {
        if order_subtotal >= threshold {
            return Ok(Decision::Free);
        }
    }

    if let Some((key, rule)) = address
        .postal_code_key()
        .and_then(|code| rules.postal_codes.get_key_value(code))
    {
        let reason = UnavailableReason::PostalCodeUnavailable;
        return tier_decision(method, "postal_codes", key, rule, Tier::PostalCode, reason);
    }

    if let Some((key, rule)) = address
        .state_key()
        .and_then(|state| rules.provinces.get_key_value(state))
    {
        let reason = UnavailableReason::ProvinceUnavailable;
        return tier_decision(method, "provinces", key, rule, Tier::Province, reason);
    }

    Ok(Decision::Paid {
        tier: Tier::National,
        cost: method.base_cost,
    })
}

/// Decision for a matched entry; only this entry's cost is checked
fn tier_decision(
    method: &ShippingMethod,
    section: &str,
    key: &str,
    rule: &TierRule,
    tier: Tier,
    reason: UnavailableReason,
) -> std::result::Result<Decision, ContractViolation> {
    if !rule.available {
        return Ok(Decision::Rejected(reason));
    }
    if rule.cost < Decimal::ZERO {
        return Err(method.negative(format!("{}[{}].cost", section, key)));
    }
    Ok(Decision::Paid {
        tier,
        cost: rule.cost,
    })
}

fn check_request(
    method: &ShippingMethod,
    address: &Address,
    order_subtotal: Decimal,
) -> std::result::Result<(), ContractViolation> {
    if order_subtotal < Decimal::ZERO {
        return Err(ContractViolation::NegativeSubtotal(order_subtotal));
    }

    method.check_contract()?;

    if method.requires_address {
        let missing = address.missing_delivery_fields();
        if !missing.is_empty() {
            return Err(ContractViolation::IncompleteAddress {
                code: method.code.clone(),
                missing,
            });
        }
    }

    Ok(())
}

fn unavailable(method: &ShippingMethod, reason: UnavailableReason) -> Resolution {
    Resolution::Unavailable(Unavailable {
        method_id: method.id,
        code: method.code.clone(),
        reason,
    })
}

fn estimate(method: &ShippingMethod) -> EstimatedDays {
    EstimatedDays {
        min: method.estimated_days_min,
        max: method.estimated_days_max,
    }
}

fn method_ref(method: &ShippingMethod) -> MethodRef {
    MethodRef {
        id: method.id,
        code: method.code.clone(),
        name: method.name.clone(),
        carrier_name: method.carrier_name.clone(),
    }
}

impl Resolution {
    pub fn is_quoted(&self) -> bool {
        matches!(self, Resolution::Quoted(_))
    }

    pub fn quote(&self) -> Option<&Quote> {
        match self {
            Resolution::Quoted(quote) => Some(quote),
            Resolution::Unavailable(_) => None,
        }
    }

    pub fn reason(&self) -> Option<UnavailableReason> {
        match self {
            Resolution::Quoted(_) => None,
            Resolution::Unavailable(u) => Some(u.reason),
        }
    }

    pub fn into_quote(self) -> std::result::Result<Quote, Unavailable> {
        match self {
            Resolution::Quoted(quote) => Ok(quote),
            Resolution::Unavailable(u) => Err(u),
        }
    }
}
