//! Print the merged configuration tree.

use anyhow::Result;

use crate::config;

pub fn run() -> Result<()> {
    let tree = config::load()?;
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}
