use clap::Parser;

pub mod charts;
pub mod cli;
pub mod data;
pub mod metrics;
pub mod report;

use cli::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let records = data::load_records(&args.results)?;
    let table = metrics::derive(&records)?;

    charts::render_all(&table, &args.out_dir)?;
    report::print_summary(&table)?;

    Ok(())
}
