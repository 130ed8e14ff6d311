//! Availability aggregation: every method that can ship to an address
//!
//! Disabled methods are skipped and methods that reject the address are
//! dropped silently. Only contract violations are surfaced.

use crate::address::Address;
use crate::error::Result;
use crate::method::ShippingMethod;
use crate::resolve::{Quote, Resolution, Resolver};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A method offered at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AvailableMethod {
    #[serde(flatten)]
    pub quote: Quote,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    pub requires_address: bool,
    pub allow_cash_on_delivery: bool,
}

/// Resolve each enabled method, keeping input order
pub fn list_available_methods<'a, I>(
    methods: I,
    address: &Address,
    order_subtotal: Decimal,
    is_bulky: bool,
) -> Result<Vec<AvailableMethod>>
where
    I: IntoIterator<Item = &'a ShippingMethod>,
{
    let resolver = Resolver::new();
    let mut available = Vec::new();

    for method in methods {
        if !method.enabled {
            continue;
        }

        match resolver.resolve(method, address, order_subtotal, is_bulky)? {
            Resolution::Quoted(quote) => available.push(AvailableMethod {
                quote,
                description: method.description.clone(),
                icon: method.icon.clone(),
                requires_address: method.requires_address,
                allow_cash_on_delivery: method.allow_cash_on_delivery,
            }),
            Resolution::Unavailable(skipped) => {
                tracing::debug!(
                    method = %skipped.code,
                    reason = %skipped.reason,
                    "omitting unavailable shipping method"
                );
            }
        }
    }

    Ok(available)
}
