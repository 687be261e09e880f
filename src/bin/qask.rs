use std::process;

use clap::Parser;
use qroute::commands::ask::{self, AskArgs};

#[derive(Debug, Parser)]
#[command(
    name = "qask",
    about = "Dispatch a query to a response strategy",
    disable_version_flag = true
)]
struct Cli {
    #[command(flatten)]
    ask: AskArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = ask::run(cli.ask).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
