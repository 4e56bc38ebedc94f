fn main() -> anyhow::Result<()> {
    specgate::run()?;
    Ok(())
}
