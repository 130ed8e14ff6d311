//! CLI utility helpers

use shipcascade::{money, Address, Catalog, Error, Result};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether a bare flag is present
pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Value following the first of `names`
pub fn flag_value<'a>(args: &'a [String], names: &[&str]) -> Option<&'a str> {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Parse --output argument to determine output file path
pub fn parse_output_arg(args: &[String]) -> Option<PathBuf> {
    flag_value(args, &["--output", "-o"]).map(PathBuf::from)
}

/// Parse the required --subtotal argument
pub fn parse_subtotal_arg(args: &[String]) -> Result<Decimal> {
    let raw = flag_value(args, &["--subtotal", "-s"])
        .ok_or_else(|| Error::from("Missing --subtotal <amount>"))?;
    money::parse_amount(raw).ok_or_else(|| format!("Invalid subtotal: {}", raw).into())
}

/// Build the destination from --postal-code, --state, --city and --country
pub fn parse_address_args(args: &[String]) -> Address {
    let mut address = Address::new();
    if let Some(v) = flag_value(args, &["--postal-code", "--zip"]) {
        address = address.with_postal_code(v);
    }
    if let Some(v) = flag_value(args, &["--state", "--province"]) {
        address = address.with_state(v);
    }
    if let Some(v) = flag_value(args, &["--city"]) {
        address = address.with_city(v);
    }
    if let Some(v) = flag_value(args, &["--country"]) {
        address = address.with_country(v);
    }
    address
}

/// First positional argument, the catalog path
pub fn catalog_arg<'a>(args: &'a [String], usage: &str) -> Result<&'a Path> {
    match args.first() {
        Some(path) if !path.starts_with('-') => Ok(Path::new(path)),
        _ => Err(usage.into()),
    }
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::load(path)
}

/// Write content to file or stdout
pub fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content).map_err(Error::Io)?;
            eprintln!("Written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_address_and_subtotal() {
        let args = args(&[
            "catalog.yaml",
            "--postal-code",
            "1425",
            "--province",
            "Buenos Aires",
            "--subtotal",
            "15000.50",
            "--bulky",
        ]);
        let address = parse_address_args(&args);
        assert_eq!(address.postal_code.as_deref(), Some("1425"));
        assert_eq!(address.state.as_deref(), Some("Buenos Aires"));
        assert!(address.city.is_none());
        assert_eq!(parse_subtotal_arg(&args).unwrap(), Decimal::new(1500050, 2));
        assert!(has_flag(&args, "--bulky"));
        assert_eq!(catalog_arg(&args, "usage").unwrap(), Path::new("catalog.yaml"));
    }

    #[test]
    fn test_missing_values() {
        let args = args(&["--subtotal"]);
        assert!(parse_subtotal_arg(&args).is_err());
        assert!(catalog_arg(&args, "usage").is_err());
        assert!(parse_subtotal_arg(&["--subtotal".into(), "abc".into()]).is_err());
    }
}
