use clap::Parser;
use lumina_rag::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => cli::serve::run(args).await,
        Command::Doctor(args) => cli::doctor::run(args).await,
    }
}
