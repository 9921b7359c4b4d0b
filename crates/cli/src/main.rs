use clap::Parser;
use pogo_cli::{
    cli::{Cli, Commands},
    error::CliError,
    logging, runner,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => handle_error(err),
    };
    std::process::exit(code);
}

async fn dispatch(cli: Cli) -> pogo_cli::error::Result<i32> {
    match cli.command {
        Commands::Run(args) => runner::run(&args, cli.format).await,
        Commands::List(args) => runner::list(&args),
    }
}

fn handle_error(err: CliError) -> i32 {
    let code = err.exit_code();
    // Alternate formatting prints the full source chain.
    eprintln!("error: {:#}", anyhow::Error::from(err));
    code
}
