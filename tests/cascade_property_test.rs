//! Property-based tests for the shipping cascade
//!
//! Uses proptest to generate random rule sets and addresses and checks the
//! cascade's ordering guarantees.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shipcascade::*;

const POSTAL_CODES: &[&str] = &["1425", "5000", "9410", "C1001"];
const PROVINCES: &[&str] = &["Buenos Aires", "Chaco", "Salta", "Tierra del Fuego"];

proptest! {
    #[test]
    fn test_postal_code_beats_province(
        method in any_method(),
        postal in prop::sample::select(POSTAL_CODES),
        province in prop::sample::select(PROVINCES),
        postal_rule in any_rule(),
        province_rule in any_rule(),
        subtotal in any_amount(),
        is_bulky in any::<bool>(),
    ) {
        let mut rules = method.rule_set().into_owned();
        rules.free_shipping_threshold = None;
        let rules = rules
            .with_postal_code(postal, postal_rule.clone())
            .with_province(province, province_rule);
        let method = method.with_rules(rules);
        let address = Address::new().with_postal_code(postal).with_state(province);

        let resolution = resolve_shipping_cost(&method, &address, subtotal, is_bulky).unwrap();
        match resolution {
            Resolution::Quoted(quote) => {
                prop_assert!(postal_rule.available);
                prop_assert_eq!(quote.tier, Tier::PostalCode);
            }
            Resolution::Unavailable(u) => {
                prop_assert!(!postal_rule.available);
                prop_assert_eq!(u.reason, UnavailableReason::PostalCodeUnavailable);
            }
        }
    }

    #[test]
    fn test_unmatched_address_falls_back_to_national(
        method in any_method(),
        subtotal in any_amount(),
        is_bulky in any::<bool>(),
    ) {
        let mut rules = method.rule_set().into_owned();
        rules.free_shipping_threshold = None;
        let method = method.with_rules(rules.clone());
        let address = Address::new().with_postal_code("0000").with_state("Atlantis");

        let resolution = resolve_shipping_cost(&method, &address, subtotal, is_bulky).unwrap();
        let quote = resolution.quote().unwrap();
        let extra = if is_bulky { rules.bulky_extra.unwrap_or_default() } else { Decimal::ZERO };

        prop_assert_eq!(quote.tier, Tier::National);
        prop_assert_eq!(quote.cost, round2(method.base_cost + extra));
    }

    #[test]
    fn test_free_shipping_wins_when_threshold_met(
        method in any_method(),
        postal in prop::sample::select(POSTAL_CODES),
        province in prop::sample::select(PROVINCES),
        threshold in any_amount(),
        above in 0i64..100_000,
        is_bulky in any::<bool>(),
    ) {
        let rules = method.rule_set().into_owned().with_free_shipping_threshold(threshold);
        let method = method.with_rules(rules);
        let address = Address::new().with_postal_code(postal).with_state(province);
        let subtotal = threshold + Decimal::new(above, 2);

        let resolution = resolve_shipping_cost(&method, &address, subtotal, is_bulky).unwrap();
        let quote = resolution.quote().unwrap();
        prop_assert_eq!(quote.tier, Tier::FreeShipping);
        prop_assert_eq!(quote.cost, Decimal::ZERO);
        prop_assert!(quote.free_shipping);
    }

    #[test]
    fn test_unavailable_entry_is_terminal(
        method in any_method(),
        province in prop::sample::select(PROVINCES),
        subtotal in any_amount(),
    ) {
        let mut rules = method.rule_set().into_owned();
        rules.free_shipping_threshold = None;
        rules.postal_codes.clear();
        let method = method.with_rules(rules.with_province(province, TierRule::unavailable()));
        let address = Address::new().with_postal_code("0000").with_state(province);

        let resolution = resolve_shipping_cost(&method, &address, subtotal, true).unwrap();
        prop_assert_eq!(resolution.reason(), Some(UnavailableReason::ProvinceUnavailable));
    }

    #[test]
    fn test_resolution_is_idempotent(
        method in any_method(),
        postal in prop::sample::select(POSTAL_CODES),
        province in prop::sample::select(PROVINCES),
        subtotal in any_amount(),
        is_bulky in any::<bool>(),
    ) {
        let address = Address::new().with_postal_code(postal).with_state(province);
        let first = resolve_shipping_cost(&method, &address, subtotal, is_bulky).unwrap();
        let second = resolve_shipping_cost(&method, &address, subtotal, is_bulky).unwrap();

        prop_assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_costs_are_two_decimal_and_non_negative(
        method in any_method(),
        postal in prop::sample::select(POSTAL_CODES),
        province in prop::sample::select(PROVINCES),
        subtotal in any_amount(),
        is_bulky in any::<bool>(),
    ) {
        let address = Address::new().with_postal_code(postal).with_state(province);
        let resolution = resolve_shipping_cost(&method, &address, subtotal, is_bulky).unwrap();
        if let Resolution::Quoted(quote) = resolution {
            prop_assert!(quote.cost >= Decimal::ZERO);
            prop_assert!(quote.cost.scale() <= 2);
            if quote.free_shipping {
                prop_assert_eq!(quote.cost, Decimal::ZERO);
            }
        }
    }
}

/// Non-negative amount with up to three decimals
fn any_amount() -> impl Strategy<Value = Decimal> {
    (0i64..5_000_000).prop_map(|n| Decimal::new(n, 3))
}

fn any_key(keys: &'static [&'static str]) -> impl Strategy<Value = String> {
    prop::sample::select(keys).prop_map(String::from)
}

fn any_rule() -> impl Strategy<Value = TierRule> {
    prop_oneof![
        3 => any_amount().prop_map(TierRule::cost),
        1 => Just(TierRule::unavailable()),
    ]
}

fn any_rule_set() -> impl Strategy<Value = RuleSet> {
    (
        prop::option::of(any_amount()),
        prop::option::of(any_amount()),
        prop::collection::btree_map(any_key(POSTAL_CODES), any_rule(), 0..3),
        prop::collection::btree_map(any_key(PROVINCES), any_rule(), 0..3),
    )
        .prop_map(|(threshold, bulky, postal_codes, provinces)| RuleSet {
            free_shipping_threshold: threshold,
            bulky_extra: bulky,
            postal_codes,
            provinces,
        })
}

fn any_method() -> impl Strategy<Value = ShippingMethod> {
    (any_amount(), any_rule_set()).prop_map(|(base_cost, rules)| {
        ShippingMethod::new(1, "generated", "Generated", base_cost).with_rules(rules)
    })
}
