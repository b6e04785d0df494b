use super::{describe_error, ui};
use crate::core::holdings::normalize_symbol;
use crate::core::provider::{DailySeries, FundDataProvider, OutputSize};
use anyhow::{Result, anyhow, bail};
use comfy_table::{Cell, Color};

const RECENT_BARS: usize = 10;

pub async fn run(provider: &dyn FundDataProvider, symbol: &str, range: OutputSize) -> Result<()> {
    let symbol = normalize_symbol(symbol);
    if symbol.is_empty() {
        bail!("Please enter a symbol");
    }

    let spinner = ui::new_spinner(format!("Fetching {range} price history of {symbol}..."));
    let series = provider.fetch_daily_series(&symbol, range).await;
    spinner.finish_and_clear();

    let series = series.map_err(|e| anyhow!(describe_error(&e)))?;
    println!("{}", render(&symbol, &series)?);
    Ok(())
}

fn render(symbol: &str, series: &DailySeries) -> Result<String> {
    let Some(summary) = series.summary() else {
        bail!("No price data returned for {symbol}");
    };

    let mut metrics = ui::new_styled_table();
    metrics.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
    let change_cell = match (summary.change, summary.change_pct) {
        (Some(change), Some(pct)) => Cell::new(format!("{change:+.2} ({pct:+.2}%)"))
            .fg(if change >= 0.0 { Color::Green } else { Color::Red }),
        _ => Cell::new("N/A").fg(Color::DarkGrey),
    };
    metrics.add_row(vec![
        Cell::new(format!("Close ({})", summary.date)),
        ui::number_cell(format!("${:.2}", summary.close)),
    ]);
    metrics.add_row(vec![Cell::new("Change"), change_cell]);
    metrics.add_row(vec![
        Cell::new("High (52w)"),
        ui::number_cell(format!("${:.2}", summary.high_52w)),
    ]);
    metrics.add_row(vec![
        Cell::new("Low (52w)"),
        ui::number_cell(format!("${:.2}", summary.low_52w)),
    ]);
    metrics.add_row(vec![
        Cell::new("Avg volume (20d)"),
        ui::number_cell(format!("{:.2}M", summary.avg_volume_20d / 1e6)),
    ]);

    let mut recent = ui::new_styled_table();
    recent.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Open"),
        ui::header_cell("High"),
        ui::header_cell("Low"),
        ui::header_cell("Close"),
        ui::header_cell("Volume"),
    ]);
    for (date, bar) in series.bars.iter().rev().take(RECENT_BARS) {
        recent.add_row(vec![
            Cell::new(date),
            ui::number_cell(format!("{:.2}", bar.open)),
            ui::number_cell(format!("{:.2}", bar.high)),
            ui::number_cell(format!("{:.2}", bar.low)),
            ui::number_cell(format!("{:.2}", bar.close)),
            ui::number_cell(format!("{:.0}", bar.volume)),
        ]);
    }

    Ok(format!(
        "{}\n\n{}\n\n{} trading days, latest {}\n{}",
        ui::style_text(&format!("{symbol} price"), ui::StyleType::Title),
        metrics,
        series.bars.len(),
        series.bars.len().min(RECENT_BARS),
        recent
    ))
}
