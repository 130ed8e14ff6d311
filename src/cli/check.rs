//! Catalog check CLI command

use super::util::{catalog_arg, has_flag, parse_output_arg, write_output};
use shipcascade::*;
use std::path::Path;

const CHECK_USAGE: &str =
    "Usage: shipcascade check <catalog.yaml> [--strict] [--json] [--sanitize [--output <file>]]";

pub fn cmd_check(args: &[String]) -> Result<()> {
    let path = catalog_arg(args, CHECK_USAGE)?;
    let strict = has_flag(args, "--strict");
    let json_output = has_flag(args, "--json");

    if has_flag(args, "--sanitize") {
        return sanitize(path, args);
    }

    let report = validate_catalog_file(path);

    if json_output {
        let output = serde_json::json!({
            "valid": report.passes(strict),
            "errors": report.error_count(),
            "warnings": report.warning_count(),
            "methods_checked": report.methods_checked,
            "issues": report.issues,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if report.issues.is_empty() {
        println!(
            "✓ Catalog is valid ({} method(s) checked)",
            report.methods_checked
        );
    } else {
        for issue in &report.issues {
            let (prefix, level) = match issue.severity {
                Severity::Error => ("✗", "ERROR"),
                Severity::Warning => ("⚠", "WARN"),
            };
            println!("{} [{}] {}: {}", prefix, issue.code, level, issue.message);
            if let Some(method) = &issue.method {
                println!("  Method: {}", method);
            }
        }
        println!();
        println!(
            "{} {} error(s), {} warning(s)",
            if report.passes(strict) { "✓" } else { "✗" },
            report.error_count(),
            report.warning_count()
        );
    }

    if report.passes(strict) {
        Ok(())
    } else {
        Err("Catalog validation failed".into())
    }
}

/// Rewrite the catalog with normalized rule keys
fn sanitize(path: &Path, args: &[String]) -> Result<()> {
    let mut file = Catalog::load(path)?.to_file();
    let changes = sanitize_catalog(&mut file);

    for change in &changes {
        eprintln!(
            "{}: {} key(s) trimmed, {} empty key(s) dropped, provinces dropped: [{}]",
            change.method,
            change.trimmed_keys.len(),
            change.dropped_empty_keys,
            change.dropped_provinces.join(", ")
        );
    }

    let content = if has_flag(args, "--json") {
        serde_json::to_string_pretty(&file)?
    } else {
        file.to_yaml()?
    };

    write_output(&parse_output_arg(args), &content)
}
