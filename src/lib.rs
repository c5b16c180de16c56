pub mod app;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::app::App;
use crate::core::config::AppConfig;
use crate::core::{HoldingPatch, NewHolding};
use anyhow::Result;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum AppCommand {
    Summary { json: bool },
    Quote {
        symbol: String,
        asset_class: String,
        json: bool,
    },
    List,
    Add(NewHolding),
    Edit { id: Uuid, patch: HoldingPatch },
    Remove { id: Uuid },
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("portwatch starting...");
    let app = App::open(load_config(config_path)?)?;

    match command {
        AppCommand::Summary { json } => cli::summary::run(&app, json).await,
        AppCommand::Quote {
            symbol,
            asset_class,
            json,
        } => cli::quote::run(&app, &symbol, &asset_class, json).await,
        AppCommand::List => cli::holdings::list(&app).await,
        AppCommand::Add(input) => cli::holdings::add(&app, input).await,
        AppCommand::Edit { id, patch } => cli::holdings::edit(&app, id, patch).await,
        AppCommand::Remove { id } => cli::holdings::remove(&app, id).await,
    }
}
