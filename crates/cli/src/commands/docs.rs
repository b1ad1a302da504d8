use anyhow::{Context, Result};
use std::path::Path;

pub fn docs_command(output: &Path) -> Result<()> {
    pme_core::config::docs::write_index(output)
        .with_context(|| format!("Failed to write property index to {}", output.display()))?;
    println!("Wrote property index to {}", output.display());
    Ok(())
}
