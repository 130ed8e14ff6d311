//! End-to-end tests over catalog files and the rule store

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use shipcascade::*;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

fn demo_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/catalog.yaml")
}

fn demo_service() -> ShippingService<InMemoryRuleStore> {
    let catalog = Catalog::load(&demo_catalog_path()).unwrap();
    ShippingService::new(InMemoryRuleStore::new(catalog))
}

#[test]
fn test_demo_catalog_is_clean() {
    let report = validate_catalog_file(&demo_catalog_path());
    assert!(report.passes(true), "{:?}", report.issues);
    assert_eq!(report.methods_checked, 2);
}

#[test]
fn test_demo_options_for_capital() {
    let service = demo_service();
    let address = Address::new().with_state("Capital Federal");

    let options = service
        .get_available_shipping_methods(&address, dec(12000), false)
        .unwrap();
    let priced: Vec<_> = options
        .iter()
        .map(|m| (m.quote.method.code.as_str(), m.quote.cost, m.quote.tier))
        .collect();
    assert_eq!(
        priced,
        vec![
            ("correo_standard", dec(1000), Tier::Province),
            ("oca_express", dec(1800), Tier::Province),
        ]
    );
}

#[test]
fn test_demo_free_shipping_only_for_correo() {
    let service = demo_service();
    let options = service
        .get_available_shipping_methods(&Address::new().with_state("Salta"), dec(25000), true)
        .unwrap();

    assert!(options[0].quote.free_shipping);
    assert_eq!(options[0].quote.original_cost, dec(1500));
    assert_eq!(options[1].quote.cost, dec(3300));
    assert_eq!(options[1].quote.breakdown.bulky_extra, dec(800));
}

#[test]
fn test_demo_ushuaia_postal_code() {
    let service = demo_service();
    let address = Address::new()
        .with_postal_code("9410")
        .with_state("Tierra del Fuego");

    let options = service
        .get_available_shipping_methods(&address, dec(5000), false)
        .unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].quote.method.code, "correo_standard");

    let validation = service
        .validate_shipping_method(2, &address, dec(5000), false)
        .unwrap();
    assert!(!validation.valid);
    assert_eq!(
        validation.reason,
        Some(UnavailableReason::PostalCodeUnavailable)
    );

    let err = service
        .calculate_shipping_cost(2, &address, dec(5000), false)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Unavailable(UnavailableReason::PostalCodeUnavailable)
    ));
}

#[test]
fn test_camel_case_records_are_accepted() {
    let json = r#"{
        "version": 1,
        "methods": [{
            "id": 9,
            "code": "moto",
            "name": "Moto mensajería",
            "baseCost": "800.50",
            "estimatedDaysMin": 0,
            "estimatedDaysMax": 1,
            "rules": {
                "postalCodes": { "1425": { "cost": 600 } },
                "provinces": null,
                "bulkyExtra": 300
            }
        }]
    }"#;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, json).unwrap();

    let service = ShippingService::new(InMemoryRuleStore::new(Catalog::load(&path).unwrap()));
    let address = Address::new().with_postal_code("1425");
    let quote = service
        .calculate_shipping_cost(9, &address, dec(100), true)
        .unwrap();

    assert_eq!(quote.tier, Tier::PostalCode);
    assert_eq!(quote.cost, dec(900));
    assert_eq!(quote.original_cost, Decimal::new(80050, 2));
    assert_eq!(quote.estimated_days, EstimatedDays { min: Some(0), max: Some(1) });
}

#[test]
fn test_sanitized_catalog_round_trips_through_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.yaml");
    std::fs::write(
        &path,
        r#"
version: 1
provinces: ["Buenos Aires", "Salta"]
methods:
  - id: 1
    code: standard
    name: Standard
    base_cost: 1500
    rules:
      provinces:
        " Salta ": { cost: 900 }
        "Bs. As.": { cost: 1200 }
"#,
    )
    .unwrap();

    let before = validate_catalog_file(&path);
    assert!(before.issues.iter().any(|i| i.code == "W011"));
    assert!(before.issues.iter().any(|i| i.code == "W014"));

    let mut file = Catalog::load(&path).unwrap().to_file();
    let changes = sanitize_catalog(&mut file);
    assert_eq!(changes.len(), 1);
    std::fs::write(&path, file.to_yaml().unwrap()).unwrap();

    let after = validate_catalog_file(&path);
    assert!(after.passes(true), "{:?}", after.issues);

    let service = ShippingService::new(InMemoryRuleStore::new(Catalog::load(&path).unwrap()));
    let quote = service
        .calculate_shipping_cost(1, &Address::new().with_state("Salta"), dec(10), false)
        .unwrap();
    assert_eq!(quote.cost, dec(900));
}

#[test]
fn test_concurrent_readers_see_whole_snapshots() {
    let store = Arc::new(InMemoryRuleStore::new(Catalog::load(&demo_catalog_path()).unwrap()));
    let service = ShippingService::new(store.snapshot());
    let address = Address::new().with_state("Buenos Aires");
    let expected = service
        .calculate_shipping_cost(1, &address, dec(1000), false)
        .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let snapshot = store.snapshot();
                    let cost = snapshot
                        .get(1)
                        .and_then(|m| m.rules.as_ref())
                        .and_then(|r| r.provinces.get("Buenos Aires"))
                        .map(|r| r.cost)
                        .unwrap();
                    let base = snapshot.get(1).unwrap().base_cost;
                    // Writers always move both amounts together
                    assert!(
                        (cost, base) == (dec(1200), dec(1500)) || (cost, base) == (dec(700), dec(999)),
                        "torn snapshot: {} / {}",
                        cost,
                        base
                    );
                }
            });
        }

        scope.spawn(|| {
            for i in 0..50 {
                let mut method = store.get_method(1).unwrap();
                let (cost, base) = if i % 2 == 0 { (700, 999) } else { (1200, 1500) };
                method.base_cost = dec(base);
                method.rules = Some(
                    method
                        .rule_set()
                        .into_owned()
                        .with_province("Buenos Aires", TierRule::cost(dec(cost))),
                );
                store.update(1, method).unwrap();
            }
        });
    });

    // A service holding an earlier snapshot is unaffected
    let again = service
        .calculate_shipping_cost(1, &address, dec(1000), false)
        .unwrap();
    assert_eq!(again, expected);
}

#[test]
fn test_shared_service_across_threads() {
    let service = demo_service();
    let address = Address::new().with_state("Córdoba");

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    serde_json::to_string(
                        &service
                            .get_available_shipping_methods(&address, dec(1000), true)
                            .unwrap(),
                    )
                    .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.windows(2).all(|w| w[0] == w[1]));
}
