use super::ui;
use crate::core::holdings::normalize_symbol;
use crate::core::provider::FundDataProvider;
use crate::core::search::{
    CancellationFlag, FleetSearchMatch, SearchOptions, SearchOutcome, SearchProgress,
    search_holders_of,
};
use crate::core::universe::{Universe, dedup_funds};
use anyhow::{Result, bail};
use comfy_table::Cell;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HoldersArgs {
    pub symbol: String,
    /// Restrict the scan to one category of the universe
    pub category: Option<String>,
    pub top: usize,
    pub all: bool,
    pub skip: usize,
    pub fetch_prices: bool,
    /// Pacing of the provider, used for the duration estimate
    pub request_delay: Duration,
}

pub async fn run(
    provider: &dyn FundDataProvider,
    universe: &Universe,
    args: &HoldersArgs,
    cancel: &CancellationFlag,
) -> Result<()> {
    let symbol = normalize_symbol(&args.symbol);
    if symbol.is_empty() {
        bail!("Please enter a stock symbol");
    }

    let funds = match &args.category {
        Some(name) => match universe.category(name) {
            Some(category) => dedup_funds(&category.funds),
            None => bail!(
                "Unknown category '{}'. Available: {}",
                name,
                universe
                    .categories
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
        None => universe.funds(),
    };

    let remaining = funds.len().saturating_sub(args.skip);
    let estimate = args.request_delay * remaining as u32;
    println!(
        "Searching {} in {} ETFs. {}",
        ui::style_text(&symbol, ui::StyleType::TotalLabel),
        remaining,
        ui::style_text(
            &format!(
                "This takes about {} minutes due to API rate limits (Ctrl-C stops early).",
                estimate.as_secs().div_ceil(60)
            ),
            ui::StyleType::Subtle
        )
    );

    let options = SearchOptions {
        fetch_prices: args.fetch_prices,
        skip: args.skip,
    };
    let pb = ui::new_progress_bar(0, true);
    let mut outcome = search_holders_of(
        provider,
        &symbol,
        &funds,
        &options,
        cancel,
        &mut |progress: &SearchProgress| {
            pb.set_length(progress.total as u64);
            pb.set_position(progress.scanned as u64);
            match &progress.current_fund {
                Some(fund) => pb.set_message(format!(
                    "Searching in {} ({} found)",
                    fund, progress.matches
                )),
                None if args.fetch_prices && progress.matches > 0 => {
                    pb.set_message("Fetching current prices...")
                }
                None => {}
            }
        },
    )
    .await;
    pb.finish_and_clear();

    rank_by_net_assets(&mut outcome.matches);
    println!("{}", render(&outcome, args));
    Ok(())
}

/// Orders matches by net assets, largest first. Ties keep scan order.
pub fn rank_by_net_assets(matches: &mut [FleetSearchMatch]) {
    matches.sort_by(|a, b| b.net_assets.total_cmp(&a.net_assets));
}

fn render(outcome: &SearchOutcome, args: &HoldersArgs) -> String {
    let symbol = &outcome.target;
    let mut output = String::new();

    if outcome.matches.is_empty() {
        output.push_str(&ui::style_text(
            &format!("No ETFs found holding {symbol}"),
            ui::StyleType::Warning,
        ));
    } else {
        let shown = if args.all {
            outcome.matches.len()
        } else {
            args.top.min(outcome.matches.len())
        };
        output.push_str(&format!(
            "Found {} ETFs holding {}. Showing {}:\n{}",
            outcome.matches.len(),
            ui::style_text(symbol, ui::StyleType::TotalLabel),
            if shown == outcome.matches.len() {
                "all by market cap".to_string()
            } else {
                format!("top {shown} by market cap")
            },
            matches_table(symbol, &outcome.matches[..shown]),
        ));
    }

    if !outcome.failures.is_empty() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "{} ETFs could not be fetched and were skipped: {}",
                    outcome.failures.len(),
                    outcome
                        .failures
                        .iter()
                        .map(|(fund, _)| fund.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                ui::StyleType::Error
            )
        ));
        if outcome.failures.iter().any(|(_, e)| e.is_rate_limited()) {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    "Some funds hit the API rate limit. Retry later or raise providers.alpha_vantage.request_delay_secs",
                    ui::StyleType::Warning
                )
            ));
        } else if let Some((_, reason)) = outcome.failures.last() {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(&format!("Last error: {reason}"), ui::StyleType::Subtle)
            ));
        }
    }

    if outcome.cancelled && outcome.scanned < outcome.total {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "Search interrupted after {} of {} funds. Resume with {}",
                    outcome.scanned,
                    outcome.total,
                    resume_hint(outcome, args)
                ),
                ui::StyleType::Warning
            )
        ));
    }
    if outcome.prices_cancelled {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                "Price lookup interrupted, prices are incomplete",
                ui::StyleType::Warning
            )
        ));
    }

    output
}

/// Command line arguments that continue an interrupted scan.
fn resume_hint(outcome: &SearchOutcome, args: &HoldersArgs) -> String {
    let mut hint = format!("etfscope holders {} --skip {}", outcome.target, outcome.scanned);
    if let Some(category) = &args.category {
        hint.push_str(&format!(" --category \"{category}\""));
    }
    hint
}

fn matches_table(symbol: &str, matches: &[FleetSearchMatch]) -> comfy_table::Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Rank"),
        ui::header_cell("ETF"),
        ui::header_cell("Name"),
        ui::header_cell("Price"),
        ui::header_cell("Market Cap"),
        ui::header_cell("DY"),
        ui::header_cell("Fee"),
        ui::header_cell(&format!("{symbol} Weight")),
    ]);

    for (rank, m) in matches.iter().enumerate() {
        table.add_row(vec![
            Cell::new(format!("#{}", rank + 1)),
            Cell::new(&m.etf_symbol),
            Cell::new(ui::truncate(m.etf_name.as_deref().unwrap_or("N/A"), 30)),
            ui::format_optional_cell(m.latest_close.and_then(ui::positive), |p| {
                format!("${p:.2}")
            }),
            ui::format_optional_cell(ui::positive(m.net_assets), ui::format_billions),
            ui::format_optional_cell(ui::positive(m.dividend_yield), ui::format_ratio),
            ui::format_optional_cell(ui::positive(m.expense_ratio), ui::format_ratio),
            ui::format_optional_cell(ui::positive(m.holding_weight), ui::format_ratio),
        ]);
    }
    table
}
