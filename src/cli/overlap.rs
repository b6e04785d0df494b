use super::{describe_error, ui};
use crate::core::holdings::normalize_symbol;
use crate::core::overlap::{OverlapResult, compare_funds};
use crate::core::provider::FundDataProvider;
use anyhow::{Result, anyhow};
use comfy_table::Cell;
use tracing::info;

pub async fn run(
    provider: &dyn FundDataProvider,
    fund_a: &str,
    fund_b: &str,
    limit: usize,
) -> Result<()> {
    let (fund_a, fund_b) = (normalize_symbol(fund_a), normalize_symbol(fund_b));

    let spinner = ui::new_spinner(format!("Fetching holdings of {fund_a} and {fund_b}..."));
    let result = compare_funds(provider, &fund_a, &fund_b).await;
    spinner.finish_and_clear();

    let result = result.map_err(|e| anyhow!(describe_error(&e)))?;
    info!(
        "Overlap between {} and {}: {:.2}%",
        fund_a, fund_b, result.overlap_average
    );
    println!("{}", render(&fund_a, &fund_b, &result, limit));
    Ok(())
}

fn render(fund_a: &str, fund_b: &str, result: &OverlapResult, limit: usize) -> String {
    let mut metrics = ui::new_styled_table();
    metrics.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
    metrics.add_row(vec![
        Cell::new("Overlap weight"),
        ui::number_cell(format!("{:.2}%", result.overlap_weight)),
    ]);
    metrics.add_row(vec![
        Cell::new(format!("{fund_a} held by {fund_b}")),
        ui::number_cell(format!("{:.2}%", result.overlap_a_in_b)),
    ]);
    metrics.add_row(vec![
        Cell::new(format!("{fund_b} held by {fund_a}")),
        ui::number_cell(format!("{:.2}%", result.overlap_b_in_a)),
    ]);
    metrics.add_row(vec![
        Cell::new(ui::style_text("Average overlap", ui::StyleType::TotalLabel)),
        ui::format_percentage_cell(result.overlap_average),
    ]);

    let mut output = format!(
        "Overlap: {}\n\n{}\n\nHoldings in {}: {}  Holdings in {}: {}  Common: {}",
        ui::style_text(&format!("{fund_a} vs {fund_b}"), ui::StyleType::Title),
        metrics,
        fund_a,
        result.total_holdings_a,
        fund_b,
        result.total_holdings_b,
        result.common_count,
    );

    if result.common_holdings.is_empty() {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text("No common holdings", ui::StyleType::Subtle)
        ));
        return output;
    }

    let mut common = ui::new_styled_table();
    common.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell(&format!("Weight in {fund_a}")),
        ui::header_cell(&format!("Weight in {fund_b}")),
        ui::header_cell("Overlap"),
    ]);
    for holding in result.common_holdings.iter().take(limit) {
        common.add_row(vec![
            Cell::new(&holding.ticker),
            ui::number_cell(format!("{:.2}%", holding.weight_in_a)),
            ui::number_cell(format!("{:.2}%", holding.weight_in_b)),
            ui::number_cell(format!("{:.2}%", holding.overlap)),
        ]);
    }

    output.push_str(&format!(
        "\n\nTop {} common holdings\n{}",
        limit.min(result.common_count),
        common
    ));
    output
}
