//! Catalog validation for shipcascade
//!
//! Checks a catalog file for records the resolver would reject or rules
//! that can never match, and sanitizes admin-entered rule keys.

use crate::catalog::{CatalogFile, CATALOG_VERSION};
use crate::method::{RuleSet, ShippingMethod, TierRule};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

/// Postal code keys: letters, digits, inner spaces and dashes (e.g. "C1425", "1425")
static POSTAL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 -]*$").expect("Invalid postal key regex pattern")
});

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A validation issue found in a catalog
#[derive(Debug, Clone, Serialize)]
pub struct CatalogIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl CatalogIssue {
    pub fn error(code: &str, message: &str, method: Option<&str>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.to_string(),
            message: message.to_string(),
            method: method.map(str::to_string),
        }
    }

    pub fn warning(code: &str, message: &str, method: Option<&str>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            message: message.to_string(),
            method: method.map(str::to_string),
        }
    }
}

/// Result of catalog validation
#[derive(Debug, Default, Serialize)]
pub struct CatalogReport {
    pub file: Option<String>,
    pub issues: Vec<CatalogIssue>,
    pub methods_checked: usize,
}

impl CatalogReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Whether the catalog passes; `strict` treats warnings as errors
    pub fn passes(&self, strict: bool) -> bool {
        !self.has_errors() && !(strict && self.has_warnings())
    }
}

/// Validate a catalog file on disk
pub fn validate_catalog_file(path: &Path) -> CatalogReport {
    let file_str = path.display().to_string();
    let mut report = CatalogReport {
        file: Some(file_str),
        ..Default::default()
    };

    if !path.exists() {
        report
            .issues
            .push(CatalogIssue::error("E001", "File does not exist", None));
        return report;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            report.issues.push(CatalogIssue::error(
                "E002",
                &format!("Cannot read file: {}", e),
                None,
            ));
            return report;
        }
    };

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        CatalogFile::from_json(&content)
    } else {
        CatalogFile::from_yaml(&content)
    };

    match parsed {
        Ok(file) => {
            let checked = validate_catalog(&file);
            report.issues = checked.issues;
            report.methods_checked = checked.methods_checked;
        }
        Err(e) => report.issues.push(CatalogIssue::error(
            "E003",
            &format!("Invalid catalog document: {}", e),
            None,
        )),
    }
    report
}

/// Validate a parsed catalog document
pub fn validate_catalog(file: &CatalogFile) -> CatalogReport {
    let mut report = CatalogReport::default();

    if file.version != CATALOG_VERSION {
        report.issues.push(CatalogIssue::error(
            "E004",
            &format!(
                "Unsupported version: {}. Only version {} is supported.",
                file.version, CATALOG_VERSION
            ),
            None,
        ));
    }

    if file.methods.is_empty() {
        report.issues.push(CatalogIssue::warning(
            "W001",
            "Catalog has no shipping methods",
            None,
        ));
    } else if !file.methods.iter().any(|m| m.enabled) {
        report.issues.push(CatalogIssue::warning(
            "W002",
            "No shipping method is enabled; checkout will offer nothing",
            None,
        ));
    }

    check_uniqueness(&file.methods, &mut report);

    for method in &file.methods {
        check_method(method, &file.provinces, &mut report);
    }

    report.methods_checked = file.methods.len();
    report
}

fn check_uniqueness(methods: &[ShippingMethod], report: &mut CatalogReport) {
    let mut ids: HashMap<u64, &str> = HashMap::new();
    let mut codes: HashMap<&str, u64> = HashMap::new();

    for method in methods {
        if let Some(first) = ids.insert(method.id, &method.code) {
            report.issues.push(CatalogIssue::error(
                "E010",
                &format!("Duplicate method id {} (also used by '{}')", method.id, first),
                Some(&method.code),
            ));
        }
        if let Some(first) = codes.insert(method.code.as_str(), method.id) {
            report.issues.push(CatalogIssue::error(
                "E011",
                &format!("Duplicate method code '{}' (also used by id {})", method.code, first),
                Some(&method.code),
            ));
        }
    }
}

fn check_method(method: &ShippingMethod, provinces: &[String], report: &mut CatalogReport) {
    let code = Some(method.code.as_str());

    if method.code.trim().is_empty() {
        report.issues.push(CatalogIssue::error(
            "E014",
            &format!("Method {} has an empty code", method.id),
            code,
        ));
    }

    // Contract problems are the ones the resolver refuses on every request
    if let Err(violation) = method.check_contract() {
        let id = match violation {
            crate::error::ContractViolation::InvertedEstimate { .. } => "E013",
            _ => "E012",
        };
        report
            .issues
            .push(CatalogIssue::error(id, &violation.to_string(), code));
    }

    // Entries are only priced when they match, so report every one here
    for violation in method.check_entries() {
        report
            .issues
            .push(CatalogIssue::error("E012", &violation.to_string(), code));
    }

    let Some(rules) = &method.rules else {
        return;
    };

    if rules.free_shipping_threshold == Some(rust_decimal::Decimal::ZERO) {
        report.issues.push(CatalogIssue::warning(
            "W015",
            "free_shipping_threshold is 0; every order ships free",
            code,
        ));
    }

    check_keys("postal_codes", &rules.postal_codes, code, report);
    check_keys("provinces", &rules.provinces, code, report);

    for key in rules.postal_codes.keys() {
        let key = key.trim();
        if !key.is_empty() && !POSTAL_KEY.is_match(key) {
            report.issues.push(CatalogIssue::warning(
                "W012",
                &format!("Postal code key '{}' has unexpected characters", key),
                code,
            ));
        }
    }

    if !provinces.is_empty() {
        for name in rules.provinces.keys() {
            if !provinces.iter().any(|p| p == name.trim()) {
                report.issues.push(CatalogIssue::warning(
                    "W011",
                    &format!("Province '{}' is not in the catalog's province list", name),
                    code,
                ));
            }
        }
    }
}

fn check_keys(
    section: &str,
    entries: &BTreeMap<String, TierRule>,
    code: Option<&str>,
    report: &mut CatalogReport,
) {
    for (key, rule) in entries {
        if key.trim().is_empty() {
            report.issues.push(CatalogIssue::warning(
                "W010",
                &format!("Empty key in {}; it never matches an address", section),
                code,
            ));
        } else if key.trim() != key {
            report.issues.push(CatalogIssue::warning(
                "W014",
                &format!(
                    "Key '{}' in {} has surrounding whitespace; addresses are trimmed before lookup",
                    key, section
                ),
                code,
            ));
        }

        if !rule.available && !rule.cost.is_zero() {
            report.issues.push(CatalogIssue::warning(
                "W013",
                &format!("{}['{}'] is unavailable; its cost is ignored", section, key.trim()),
                code,
            ));
        }
    }
}

/// What [`sanitize_catalog`] changed in one method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeChange {
    pub method: String,
    pub trimmed_keys: Vec<String>,
    pub dropped_empty_keys: usize,
    pub dropped_provinces: Vec<String>,
}

impl SanitizeChange {
    fn is_empty(&self) -> bool {
        self.trimmed_keys.is_empty()
            && self.dropped_empty_keys == 0
            && self.dropped_provinces.is_empty()
    }
}

/// Normalize admin-entered rule keys in place
///
/// Keys are trimmed and empty keys removed. When the catalog carries a
/// province list, provinces outside it are dropped. Returns one entry per
/// method that changed.
pub fn sanitize_catalog(file: &mut CatalogFile) -> Vec<SanitizeChange> {
    let mut changes = Vec::new();

    for method in &mut file.methods {
        let Some(rules) = method.rules.as_mut() else {
            continue;
        };

        let mut change = SanitizeChange {
            method: method.code.clone(),
            ..Default::default()
        };
        normalize_keys(&mut rules.postal_codes, &mut change);
        normalize_keys(&mut rules.provinces, &mut change);

        if !file.provinces.is_empty() {
            change.dropped_provinces = rules.retain_canonical_provinces(&file.provinces);
        }

        if !change.is_empty() {
            tracing::info!(
                method = %change.method,
                dropped_provinces = change.dropped_provinces.len(),
                "sanitized shipping rules"
            );
            changes.push(change);
        }
        if rules.is_empty() {
            method.rules = None;
        }
    }

    changes
}

fn normalize_keys(entries: &mut BTreeMap<String, TierRule>, change: &mut SanitizeChange) {
    let mut normalized = BTreeMap::new();
    for (key, rule) in std::mem::take(entries) {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            change.dropped_empty_keys += 1;
            continue;
        }
        if trimmed != key {
            change.trimmed_keys.push(trimmed.to_string());
        }
        normalized.insert(trimmed.to_string(), rule);
    }
    *entries = normalized;
}

/// Rule set with sanitized keys, for single-method admin input
pub fn sanitize_rule_set(mut rules: RuleSet, provinces: &[String]) -> RuleSet {
    let mut change = SanitizeChange::default();
    normalize_keys(&mut rules.postal_codes, &mut change);
    normalize_keys(&mut rules.provinces, &mut change);
    if !provinces.is_empty() {
        rules.retain_canonical_provinces(provinces);
    }
    rules
}
