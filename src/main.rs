mod cli;
mod render;

use chrono::Local;
use clap::Parser;
use cli::{Cli, Commands, OutputArgs};
use hotshot::Session;
use hotshot::config::Config;
use tracing::warn;
use tracing_subscriber::EnvFilter;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hotshot=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let locale = config.display.locale;

    match cli.command {
        Commands::Regions => print!("{}", render::regions_table(locale)),
        Commands::Categories => print!("{}", render::categories_table(locale)),
        Commands::Keyword(args) => {
            let mut session = Session::from_config(config)?;
            session.run_keyword(&args.keyword, &args.region).await?;
            report(&mut session, &args.output)?;
        }
        Commands::Category(args) => {
            let mut session = Session::from_config(config)?;
            session.run_category(&args.category).await?;
            report(&mut session, &args.output)?;
        }
    }

    Ok(())
}

fn report(session: &mut Session, output: &OutputArgs) -> Result<(), AnyError> {
    session.sort_results(output.sort);
    if let Some(results) = session.results() {
        print!(
            "{}",
            render::results_table(results, output.limit, &session.config().display)
        );
    }

    for failure in session.diagnostics().failures() {
        warn!(
            operation = failure.operation,
            scope = %failure.scope,
            "Partial results: {}",
            failure.message
        );
    }

    println!(
        "Quota remaining: {} / {}",
        session.quota_remaining(),
        session.quota().limit()
    );

    if output.export {
        let path = session.export(Local::now().naive_local())?;
        println!("Exported to {}", path.display());
    }

    Ok(())
}
