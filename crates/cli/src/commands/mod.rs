//! Command handlers

pub mod admin;
pub mod bid;
pub mod directory;
pub mod tender;

use anyhow::Result;
use serde::Serialize;

/// Print a result as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
