//! CLI command implementations
//!
//! - `checkout`: quote, options and validate against a catalog file
//! - `check`: catalog validation and sanitizing
//! - `schema`: JSON schemas of the command outputs
//! - `util`: shared argument parsing

pub mod check;
pub mod checkout;
pub mod schema;
pub mod util;

pub use check::cmd_check;
pub use checkout::{cmd_options, cmd_quote, cmd_validate};
pub use schema::cmd_schema;
