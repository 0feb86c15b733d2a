use anyhow::Result;
use clap::Parser;

use sparkdwh_cli::{init_tracing, load_config, plan, render_plan, render_summary, run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    if cli.dry_run {
        let statements = plan(cli.command(), &config)?;
        println!("{}", render_plan(&statements));
        return Ok(());
    }

    let summary = run(cli.command(), &config).await?;
    println!("{}", render_summary(&summary, cli.format)?);
    Ok(())
}
