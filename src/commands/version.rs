use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("antecflux version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
