use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use qroute::commands::ask::{self, AskArgs};
use qroute::commands::config::{self, ConfigArgs};

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  qroute ask \"What's the weather in Paris?\"\n  echo \"weather in Tokyo\" | qroute ask --json\n  qroute config set --weather 0123456789abcdef\n  qroute completion bash > ~/.local/share/bash-completion/completions/qroute";

const ASK_HELP_EXAMPLES: &str = "Examples:\n  qroute ask \"What's the weather in Paris?\"\n  echo \"What is an agent?\" | qroute ask --output json\n  qroute ask --dry-run --json \"weather in Berlin\"";

#[derive(Debug, Parser)]
#[command(
    name = "qroute",
    about = "Provider-routing query CLI",
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Dispatch a query to a response strategy", after_help = ASK_HELP_EXAMPLES)]
    Ask(AskArgs),
    #[command(about = "Manage stored provider credentials")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "qroute", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "qroute", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "qroute", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask(args) => ask::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
