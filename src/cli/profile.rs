use super::{describe_error, ui};
use crate::core::holdings::fetch_profile;
use crate::core::provider::{FundDataProvider, FundProfile};
use anyhow::{Result, anyhow};
use comfy_table::Cell;

const TOP_HOLDINGS: usize = 10;

pub async fn run(provider: &dyn FundDataProvider, fund: &str) -> Result<()> {
    let spinner = ui::new_spinner(format!("Fetching profile of {}...", fund.trim()));
    let profile = fetch_profile(provider, fund).await;
    spinner.finish_and_clear();

    let profile = profile.map_err(|e| anyhow!(describe_error(&e)))?;
    println!("{}", render(&profile));
    Ok(())
}

fn render(profile: &FundProfile) -> String {
    let mut metrics = ui::new_styled_table();
    metrics.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
    metrics.add_row(vec![
        Cell::new("Name"),
        Cell::new(profile.name.as_deref().unwrap_or("N/A")),
    ]);
    metrics.add_row(vec![
        Cell::new("Net assets"),
        ui::format_optional_cell(ui::positive(profile.net_assets), ui::format_billions),
    ]);
    metrics.add_row(vec![
        Cell::new("Expense ratio"),
        ui::format_optional_cell(ui::positive(profile.expense_ratio), ui::format_ratio),
    ]);
    metrics.add_row(vec![
        Cell::new("Dividend yield"),
        ui::format_optional_cell(ui::positive(profile.dividend_yield), ui::format_ratio),
    ]);
    metrics.add_row(vec![
        Cell::new("Inception"),
        Cell::new(profile.inception_date.as_deref().unwrap_or("N/A")),
    ]);

    let mut output = format!(
        "{}\n\n{}",
        ui::style_text(&profile.symbol, ui::StyleType::Title),
        metrics
    );

    match &profile.holdings {
        None => output.push_str(&format!(
            "\n\n{}",
            ui::style_text("No holdings data reported", ui::StyleType::Warning)
        )),
        Some(holdings) => {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Ticker"),
                ui::header_cell("Description"),
                ui::header_cell("Weight"),
            ]);
            for holding in holdings.iter().take(TOP_HOLDINGS) {
                table.add_row(vec![
                    Cell::new(&holding.ticker),
                    Cell::new(ui::truncate(
                        holding.description.as_deref().unwrap_or(""),
                        40,
                    )),
                    ui::number_cell(ui::format_ratio(holding.weight)),
                ]);
            }
            output.push_str(&format!(
                "\n\nTop {} of {} holdings\n{}",
                holdings.len().min(TOP_HOLDINGS),
                holdings.len(),
                table
            ));
        }
    }

    if !profile.sectors.is_empty() {
        let mut sectors = ui::new_styled_table();
        sectors.set_header(vec![ui::header_cell("Sector"), ui::header_cell("Weight")]);
        for sector in &profile.sectors {
            sectors.add_row(vec![
                Cell::new(&sector.sector),
                ui::number_cell(ui::format_ratio(sector.weight)),
            ]);
        }
        output.push_str(&format!("\n\nSectors\n{sectors}"));
    }

    if let Some(description) = &profile.description {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(description, ui::StyleType::Subtle)
        ));
    }
    output
}
