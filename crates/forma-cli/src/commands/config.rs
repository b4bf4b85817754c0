//! Print the resolved configuration

use anyhow::Result;
use forma_pipeline::FormaConfig;

pub fn run() -> Result<()> {
    let config = FormaConfig::load()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
