use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lifeline-cli", version, about = "Lifeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trigger an emergency alert and run the confirmation workflow
    Trigger(commands::trigger::TriggerArgs),
    /// Emergency log
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Emergency contact management
    Contacts {
        #[command(subcommand)]
        action: commands::contacts::ContactsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Trigger(args) => commands::trigger::run(args),
        Commands::Log { action } => commands::log::run(action),
        Commands::Contacts { action } => commands::contacts::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
