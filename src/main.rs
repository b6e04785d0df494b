use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use etfscope::core::log::init_logging;
use etfscope::core::provider::OutputSize;

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

impl From<Commands> for etfscope::AppCommand {
    fn from(cmd: Commands) -> etfscope::AppCommand {
        match cmd {
            Commands::Overlap {
                fund_a,
                fund_b,
                limit,
            } => etfscope::AppCommand::Overlap {
                fund_a,
                fund_b,
                limit,
            },
            Commands::Holders {
                symbol,
                category,
                top,
                all,
                skip,
                no_prices,
            } => etfscope::AppCommand::Holders {
                symbol,
                category,
                top,
                all,
                skip,
                no_prices,
            },
            Commands::Profile { fund } => etfscope::AppCommand::Profile { symbol: fund },
            Commands::Price { symbol, range } => etfscope::AppCommand::Price { symbol, range },
            Commands::Universe => etfscope::AppCommand::Universe,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Compare the holdings of two funds
    Overlap {
        fund_a: String,
        fund_b: String,
        /// Number of common holdings to list
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Find the funds that hold a security
    Holders {
        symbol: String,
        /// Only scan one category of the fund universe
        #[arg(long)]
        category: Option<String>,
        /// Number of funds to show, ranked by net assets
        #[arg(short, long)]
        top: Option<usize>,
        /// Show every matching fund
        #[arg(short, long)]
        all: bool,
        /// Skip the first N funds, to resume an interrupted search
        #[arg(long, default_value_t = 0)]
        skip: usize,
        /// Do not look up latest prices of matching funds
        #[arg(long)]
        no_prices: bool,
    },
    /// Show a fund's profile and top holdings
    Profile { fund: String },
    /// Show daily price history of a fund or stock
    Price {
        symbol: String,
        /// `compact` for the latest 100 days, `full` for the whole history
        #[arg(short, long, default_value = "compact")]
        range: OutputSize,
    },
    /// List the fund universe searched by `holders`
    Universe,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => etfscope::cli::setup::setup_at_path(path),
            None => etfscope::cli::setup::setup(),
        },
        Some(cmd) => etfscope::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
