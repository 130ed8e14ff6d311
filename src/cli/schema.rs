//! Schema CLI command

use shipcascade::*;

pub fn cmd_schema(args: &[String]) -> Result<()> {
    let schema_name = args.first().map(|s| s.as_str()).unwrap_or("list");

    match schema_name {
        "list" => {
            println!("Available schemas: catalog, quote, options, validation");
            Ok(())
        }
        "catalog" => print_schema::<CatalogFile>(),
        "quote" => print_schema::<Quote>(),
        "options" => print_schema::<Vec<AvailableMethod>>(),
        "validation" => print_schema::<Validation>(),
        _ => Err(format!("Unknown schema: {}", schema_name).into()),
    }
}

fn print_schema<T: schemars::JsonSchema>() -> Result<()> {
    let schema = schemars::schema_for!(T);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
