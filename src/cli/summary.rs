use super::ui;
use crate::app::App;
use crate::core::PortfolioView;
use anyhow::Result;
use comfy_table::Cell;

impl PortfolioView {
    pub fn display_as_table(&self) -> String {
        let currency = &self.currency;

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Class"),
            ui::header_cell("Quantity"),
            ui::header_cell("Buy Price"),
            ui::header_cell("Price"),
            ui::header_cell("Value"),
            ui::header_cell("Invested"),
            ui::header_cell("PnL"),
            ui::header_cell("PnL (%)"),
        ]);

        for asset in &self.assets {
            let row_currency = asset.currency.clone();
            table.add_row(vec![
                Cell::new(&asset.symbol),
                Cell::new(asset.asset_class.as_str()),
                ui::number_cell(asset.quantity),
                ui::number_cell(asset.buy_price),
                ui::format_optional_cell(asset.current_price, |p| {
                    format!("{p:.2} {row_currency}")
                }),
                ui::format_optional_cell(asset.current_value, |v| format!("{v:.2}")),
                ui::number_cell(asset.invested),
                ui::signed_cell(asset.pnl, ""),
                ui::signed_cell(asset.pnl_pct, "%"),
            ]);
        }

        let mut output = format!(
            "Portfolio ({})\n\n",
            ui::style_text(currency, ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let errors: Vec<_> = self
            .assets
            .iter()
            .filter_map(|a| a.error.as_ref().map(|e| (&a.symbol, e)))
            .collect();
        if !errors.is_empty() {
            output.push_str("\n\n");
            for (symbol, error) in errors {
                output.push_str(&ui::style_text(
                    &format!("{symbol}: {error}\n"),
                    ui::StyleType::Error,
                ));
            }
        }

        let summary = &self.summary;
        let pnl_style = if summary.net_pnl >= 0.0 {
            ui::StyleType::TotalValue
        } else {
            ui::StyleType::Error
        };
        output.push_str(&format!(
            "\n\n{} {:.2}\n{} {:.2}\n{} {}",
            ui::style_text("Total Invested:", ui::StyleType::TotalLabel),
            summary.total_invested,
            ui::style_text("Current Value:", ui::StyleType::TotalLabel),
            summary.total_current_value,
            ui::style_text("Net PnL:", ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("{:.2} ({:.2}%)", summary.net_pnl, summary.net_pnl_pct),
                pnl_style
            ),
        ));

        output
    }
}

pub async fn run(app: &App, json: bool) -> Result<()> {
    let holdings = app.holdings().await?;
    let pb = if json {
        indicatif::ProgressBar::hidden()
    } else {
        ui::new_progress_bar(holdings.len() as u64, true)
    };
    pb.set_message("Fetching quotes...");

    let view = app.portfolio_view(&holdings, &|| pb.inc(1)).await;
    pb.finish_and_clear();
    app.flush()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if view.assets.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No holdings yet. Add one with `portwatch add`.",
                ui::StyleType::Subtle
            )
        );
    } else {
        println!("{}", view.display_as_table());
    }
    Ok(())
}
