//! shipcascade CLI - Command-line interface
//!
//! Commands:
//!   quote     - Price one shipping method for an address
//!   options   - List every method that can ship to an address
//!   validate  - Re-check a chosen method before placing an order
//!   check     - Validate a catalog file
//!   schema    - Print JSON schema for an output type

mod cli;

use shipcascade::*;
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init(logging::DEFAULT_FILTER);

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "quote" => cli::cmd_quote(&args[2..]),
        "options" => cli::cmd_options(&args[2..]),
        "validate" => cli::cmd_validate(&args[2..]),
        "check" => cli::cmd_check(&args[2..]),
        "schema" => cli::cmd_schema(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("shipcascade {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
shipcascade - Shipping cost resolution

USAGE:
    shipcascade <COMMAND> [OPTIONS]

COMMANDS:
    quote <catalog> --method <id|code>   Price one method for an address
    options <catalog>                     List methods that can ship to an address
    validate <catalog> --method <id|code> Check a method is still valid (exit 1 if not)
    check <catalog> [--strict]            Validate a catalog file
    schema [name]                         Print JSON schema (catalog, quote, options, validation)
    version                               Print version

OPTIONS:
    --subtotal <amount>      Order subtotal (required for quote, options, validate)
    --postal-code <code>     Destination postal code
    --state <province>       Destination province
    --city <city>            Destination city
    --country <country>      Destination country
    --bulky                  Order contains bulky items
    --json                   JSON output format
    --strict                 Treat catalog warnings as errors (check)
    --sanitize               Print the catalog with normalized rule keys (check)
    --output <file>          Output file for --sanitize (default: stdout)

ENVIRONMENT:
    SHIPCASCADE_LOG          Log filter, e.g. "shipcascade=debug" (default: warn)

EXAMPLES:
    shipcascade options demos/catalog.yaml --state "Buenos Aires" --subtotal 15000
    shipcascade quote demos/catalog.yaml --method correo_standard --postal-code 1425 --subtotal 8000 --bulky
    shipcascade check demos/catalog.yaml --strict
"#
    );
}
