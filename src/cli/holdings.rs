use super::ui;
use crate::app::App;
use crate::core::{Holding, HoldingPatch, NewHolding};
use anyhow::{Result, bail};
use comfy_table::Cell;
use uuid::Uuid;

pub fn holdings_table(holdings: &[Holding]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Symbol"),
        ui::header_cell("Class"),
        ui::header_cell("Quantity"),
        ui::header_cell("Buy Price"),
        ui::header_cell("Added"),
    ]);
    for holding in holdings {
        table.add_row(vec![
            Cell::new(holding.id),
            Cell::new(&holding.symbol),
            Cell::new(holding.asset_class.as_str()),
            ui::number_cell(holding.quantity),
            ui::number_cell(holding.buy_price),
            Cell::new(holding.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table.to_string()
}

pub async fn list(app: &App) -> Result<()> {
    let holdings = app.store.list(app.owner()).await?;
    if holdings.is_empty() {
        println!(
            "{}",
            ui::style_text("No holdings yet.", ui::StyleType::Subtle)
        );
    } else {
        println!("{}", holdings_table(&holdings));
    }
    Ok(())
}

pub async fn add(app: &App, input: NewHolding) -> Result<()> {
    let holding = input.into_holding(app.owner())?;
    app.store.create(holding.clone()).await?;
    app.flush()?;
    tracing::info!(id = %holding.id, symbol = %holding.symbol, "Added holding");
    println!("Added {} ({})", holding.symbol, holding.id);
    Ok(())
}

pub async fn edit(app: &App, id: Uuid, patch: HoldingPatch) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to change for holding {id}");
    }
    let holding = app.store.update(app.owner(), id, &patch).await?;
    app.flush()?;
    println!("{}", holdings_table(std::slice::from_ref(&holding)));
    Ok(())
}

pub async fn remove(app: &App, id: Uuid) -> Result<()> {
    if !app.store.delete(app.owner(), id).await? {
        bail!("Holding {id} not found");
    }
    app.flush()?;
    println!("Removed {id}");
    Ok(())
}
