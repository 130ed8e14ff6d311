//! Checkout CLI commands: quote, options, validate

use super::util::{
    catalog_arg, flag_value, has_flag, load_catalog, parse_address_args, parse_subtotal_arg,
};
use shipcascade::*;

const QUOTE_USAGE: &str = "Usage: shipcascade quote <catalog.yaml> --method <id|code> --subtotal <amount> [--postal-code X] [--state X] [--city X] [--country X] [--bulky] [--json]";
const OPTIONS_USAGE: &str = "Usage: shipcascade options <catalog.yaml> --subtotal <amount> [--postal-code X] [--state X] [--city X] [--country X] [--bulky] [--json]";
const VALIDATE_USAGE: &str = "Usage: shipcascade validate <catalog.yaml> --method <id|code> --subtotal <amount> [address flags] [--bulky] [--json]";

/// Request parameters shared by the checkout commands
struct Request {
    service: ShippingService<InMemoryRuleStore>,
    address: Address,
    subtotal: rust_decimal::Decimal,
    is_bulky: bool,
    json: bool,
}

impl Request {
    fn parse(args: &[String], usage: &str) -> Result<Self> {
        let catalog = load_catalog(catalog_arg(args, usage)?)?;
        Ok(Self {
            service: ShippingService::new(InMemoryRuleStore::new(catalog)),
            address: parse_address_args(args),
            subtotal: parse_subtotal_arg(args)?,
            is_bulky: has_flag(args, "--bulky"),
            json: has_flag(args, "--json"),
        })
    }

    /// Method id for `--method`, looked up by id or code
    fn method_id(&self, args: &[String], usage: &str) -> Result<Option<MethodId>> {
        let raw = flag_value(args, &["--method", "-m"]).ok_or_else(|| Error::from(usage))?;
        Ok(self
            .service
            .store()
            .snapshot()
            .lookup(raw)
            .map(|m| m.id))
    }
}

pub fn cmd_quote(args: &[String]) -> Result<()> {
    let request = Request::parse(args, QUOTE_USAGE)?;
    let raw = flag_value(args, &["--method", "-m"]).unwrap_or_default();
    let method_id = request
        .method_id(args, QUOTE_USAGE)?
        .ok_or_else(|| Error::MethodNotFound(raw.to_string()))?;

    let quote = request.service.calculate_shipping_cost(
        method_id,
        &request.address,
        request.subtotal,
        request.is_bulky,
    )?;

    if request.json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
    } else {
        print_quote(&quote);
    }
    Ok(())
}

pub fn cmd_options(args: &[String]) -> Result<()> {
    let request = Request::parse(args, OPTIONS_USAGE)?;
    let methods = request.service.get_available_shipping_methods(
        &request.address,
        request.subtotal,
        request.is_bulky,
    )?;

    if request.json {
        println!("{}", serde_json::to_string_pretty(&methods)?);
        return Ok(());
    }

    if methods.is_empty() {
        println!("No shipping method can deliver to this address");
        return Ok(());
    }
    for method in &methods {
        print_quote(&method.quote);
        if let Some(description) = &method.description {
            println!("  {}", description);
        }
        if method.allow_cash_on_delivery {
            println!("  Cash on delivery accepted");
        }
    }
    Ok(())
}

pub fn cmd_validate(args: &[String]) -> Result<()> {
    let request = Request::parse(args, VALIDATE_USAGE)?;

    let validation = match request.method_id(args, VALIDATE_USAGE)? {
        Some(id) => request.service.validate_shipping_method(
            id,
            &request.address,
            request.subtotal,
            request.is_bulky,
        )?,
        None => Validation {
            valid: false,
            quote: None,
            reason: Some(UnavailableReason::MethodNotFound),
        },
    };

    if request.json {
        println!("{}", serde_json::to_string_pretty(&validation)?);
    } else if let Some(quote) = &validation.quote {
        println!("✓ Shipping method is valid");
        print_quote(quote);
    } else if let Some(reason) = validation.reason {
        println!("✗ Shipping method is not valid: {}", reason);
    }

    if validation.valid {
        Ok(())
    } else {
        Err("Shipping method validation failed".into())
    }
}

fn print_quote(quote: &Quote) {
    let carrier = quote
        .method
        .carrier_name
        .as_deref()
        .map(|c| format!(" [{}]", c))
        .unwrap_or_default();
    println!(
        "{} ({}){}: {:.2} via {}",
        quote.method.name, quote.method.code, carrier, quote.cost, quote.tier
    );

    if quote.free_shipping {
        println!("  Free shipping (was {:.2})", quote.original_cost);
    } else if !quote.breakdown.bulky_extra.is_zero() {
        println!(
            "  {:.2} + {:.2} bulky surcharge",
            quote.breakdown.base, quote.breakdown.bulky_extra
        );
    }

    match (quote.estimated_days.min, quote.estimated_days.max) {
        (Some(min), Some(max)) => println!("  Delivery in {}-{} days", min, max),
        (Some(days), None) | (None, Some(days)) => println!("  Delivery in {} days", days),
        (None, None) => {}
    }
}
