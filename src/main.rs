use anyhow::Result;
use clap::{Parser, Subcommand};

use chatdash::cli;

#[derive(Debug, Parser)]
#[command(name = "chatdash")]
#[command(about = "Chat with a Rasa bot, watch intent analytics, feed the training bridge")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive chat session in the terminal
    Chat {
        /// NLU backend base URL (overrides config)
        #[arg(long)]
        url: Option<String>,
        /// Sender id for this session (default: <prefix>_<unix millis>)
        #[arg(long)]
        sender: Option<String>,
    },
    /// Serve the browser dashboard
    Web {
        /// Listen address (default from config: 127.0.0.1:8085)
        #[arg(long)]
        addr: Option<String>,
        /// Don't open a browser window
        #[arg(long)]
        no_open: bool,
    },
    /// Check NLU and training backend reachability
    Health,
    /// Show the intent analysis for a message without sending it
    Parse {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// Training bridge operations
    Train {
        #[command(subcommand)]
        action: TrainAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum TrainAction {
    /// List available intents
    Intents,
    /// List examples for an intent
    Examples { intent: String },
    /// Add a training example to an intent
    Add {
        intent: String,
        #[arg(trailing_var_arg = true, required = true)]
        example: Vec<String>,
    },
    /// Train a new model
    Run {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default ~/.chatdash/config.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `nlu.url http://localhost:5005`
    Set { key: String, value: String },
    /// Restore the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Chat { url, sender } => cli::run_chat(url.as_deref(), sender.as_deref()),
        Commands::Web { addr, no_open } => cli::run_web(addr.as_deref(), no_open),
        Commands::Health => cli::run_health(),
        Commands::Parse { format, text } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_parse(&text.join(" "), fmt)
        }
        Commands::Train { action } => match action {
            TrainAction::Intents => cli::run_train_intents(),
            TrainAction::Examples { intent } => cli::run_train_examples(&intent),
            TrainAction::Add { intent, example } => cli::run_train_add(&intent, &example.join(" ")),
            TrainAction::Run { yes } => cli::run_train(yes),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
