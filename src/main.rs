use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use portwatch::core::log::init_logging;
use portwatch::core::{AssetClass, HoldingPatch, NewHolding};
use uuid::Uuid;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Value every holding at current prices
    Summary {
        /// Print the portfolio as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up the current price of a single symbol
    Quote {
        symbol: String,
        /// equity, fund, crypto or commodity
        #[arg(short, long, default_value = "equity")]
        asset_class: String,
        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },
    /// List holdings, newest first
    List,
    /// Record a new holding
    Add {
        symbol: String,
        #[arg(short, long, value_parser = parse_asset_class)]
        asset_class: AssetClass,
        #[arg(short, long)]
        quantity: f64,
        #[arg(short, long)]
        buy_price: f64,
    },
    /// Change fields of an existing holding
    Edit {
        id: Uuid,
        #[arg(short, long)]
        symbol: Option<String>,
        #[arg(short, long, value_parser = parse_asset_class)]
        asset_class: Option<AssetClass>,
        #[arg(short, long)]
        quantity: Option<f64>,
        #[arg(short, long)]
        buy_price: Option<f64>,
    },
    /// Delete a holding
    Remove { id: Uuid },
}

fn parse_asset_class(s: &str) -> Result<AssetClass, String> {
    s.parse().map_err(|e: portwatch::core::QuoteError| e.to_string())
}

impl From<Commands> for portwatch::AppCommand {
    fn from(cmd: Commands) -> portwatch::AppCommand {
        match cmd {
            Commands::Summary { json } => portwatch::AppCommand::Summary { json },
            Commands::Quote {
                symbol,
                asset_class,
                json,
            } => portwatch::AppCommand::Quote {
                symbol,
                asset_class,
                json,
            },
            Commands::List => portwatch::AppCommand::List,
            Commands::Add {
                symbol,
                asset_class,
                quantity,
                buy_price,
            } => portwatch::AppCommand::Add(NewHolding {
                symbol,
                asset_class,
                quantity,
                buy_price,
            }),
            Commands::Edit {
                id,
                symbol,
                asset_class,
                quantity,
                buy_price,
            } => portwatch::AppCommand::Edit {
                id,
                patch: HoldingPatch {
                    symbol,
                    asset_class,
                    quantity,
                    buy_price,
                },
            },
            Commands::Remove { id } => portwatch::AppCommand::Remove { id },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match &cli.config_path {
            Some(path) => portwatch::cli::setup::setup_at_path(path),
            None => portwatch::cli::setup::setup(),
        },
        Some(cmd) => portwatch::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
