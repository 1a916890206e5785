use epigraph::runner::run;

fn main() -> anyhow::Result<()> {
    run()?;
    Ok(())
}
