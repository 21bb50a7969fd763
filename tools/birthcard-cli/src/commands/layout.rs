//! Print the default layer layout.

use birthcard_composition_model::layer::Layout;

pub fn run() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&Layout::default())?);
    Ok(())
}
