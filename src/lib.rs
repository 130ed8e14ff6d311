// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # shipcascade - shipping cost resolution
//!
//! Prices a shipping method for a destination and order by walking a
//! cascade of increasingly general rules.
//!
//! ## Core Concept
//!
//! Each [`ShippingMethod`] has a base cost and an optional [`RuleSet`].
//! For a request the tiers are tried in fixed order and the first one that
//! applies wins:
//!
//! 1. **free shipping**: order subtotal reaches the method's threshold
//! 2. **postal code**: an exact entry for the destination postal code
//! 3. **province**: an exact entry for the destination province
//! 4. **national**: the method's base cost
//!
//! An entry marked `available: false` rejects the method outright; the
//! cascade never falls through to a cheaper tier after a rejection. A bulky
//! order adds `bulky_extra` on top of any non-free tier.
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use shipcascade::{resolve_shipping_cost, Address, RuleSet, ShippingMethod, Tier, TierRule};
//!
//! let method = ShippingMethod::new(1, "standard", "Standard", Decimal::new(1500, 0))
//!     .with_rules(
//!         RuleSet::default()
//!             .with_province("Buenos Aires", TierRule::cost(Decimal::new(1200, 0)))
//!             .with_bulky_extra(Decimal::new(500, 0)),
//!     );
//!
//! let address = Address::new().with_state("Buenos Aires");
//! let resolution = resolve_shipping_cost(&method, &address, Decimal::new(9000, 0), true)?;
//!
//! let quote = resolution.quote().expect("Buenos Aires is served");
//! assert_eq!(quote.tier, Tier::Province);
//! assert_eq!(quote.cost, Decimal::new(1700, 0));
//! # Ok::<(), shipcascade::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  CATALOG (YAML / JSON)                                      │
//! │       │                                                     │
//! │       └──► Catalog::load ──► RuleStore (Arc snapshots)      │
//! │                                  │                          │
//! │  CHECKOUT                        │                          │
//! │       │                          ▼                          │
//! │       ├──► get_available_shipping_methods ──► aggregate     │
//! │       │                                         │           │
//! │       ├──► calculate_shipping_cost ──┐          │           │
//! │       │                              ▼          ▼           │
//! │       └──► validate_shipping_method ──► resolve (cascade)   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Errors
//!
//! A method that cannot ship to an address is a normal outcome, returned
//! as [`Resolution::Unavailable`]. A malformed request or method record
//! (negative amounts, inverted delivery estimate, incomplete address for a
//! method that needs one) is an [`Error::Contract`].

// Model
pub mod address;
pub mod error;
pub mod method;
pub mod money;

// Resolution
pub mod aggregate;
pub mod resolve;

// Catalog and storage
pub mod catalog;
pub mod catalog_validate;
pub mod store;

// Boundary
pub mod logging;
pub mod service;

// Re-exports
pub use address::Address;
pub use aggregate::{list_available_methods, AvailableMethod};
pub use catalog::{Catalog, CatalogFile, CatalogStamp, CATALOG_VERSION};
pub use catalog_validate::{
    sanitize_catalog, sanitize_rule_set, validate_catalog, validate_catalog_file, CatalogIssue,
    CatalogReport, SanitizeChange, Severity,
};
pub use error::{ContractViolation, Error, Result};
pub use method::{MethodId, RuleSet, ShippingMethod, TierRule};
pub use money::round2;
pub use resolve::{
    resolve_shipping_cost, Breakdown, EstimatedDays, MethodRef, Quote, Resolution, Resolver,
    ResolverConfig, Tier, Unavailable, UnavailableReason,
};
pub use service::{ShippingService, Validation};
pub use store::{InMemoryRuleStore, RuleStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
