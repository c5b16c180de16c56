use super::ui;
use crate::app::App;
use anyhow::Result;

/// Looks a symbol up directly, bypassing the cache.
pub async fn run(app: &App, symbol: &str, asset_class: &str, json: bool) -> Result<()> {
    let quote = app.quote(symbol, asset_class).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
    } else {
        println!(
            "{} {:.4} {} {}",
            ui::style_text(&quote.symbol, ui::StyleType::TotalLabel),
            quote.price,
            quote.currency,
            ui::style_text(&format!("({})", quote.source), ui::StyleType::Subtle)
        );
    }
    Ok(())
}
