use clap::Parser;
use miette::{IntoDiagnostic, Result};
use scholar_payouts::application::executor::ExecutionSettings;
use scholar_payouts::application::manager::PaymentsManager;
use scholar_payouts::application::validator;
use scholar_payouts::domain::ports::ConfirmationBox;
use scholar_payouts::infrastructure::results_log::FileResultsLog;
use scholar_payouts::infrastructure::ronin::client::RoninRpcClient;
use scholar_payouts::infrastructure::ronin::contract::{BUNDLED_SLP_ABI, TokenContract};
use scholar_payouts::infrastructure::ronin::settings::{
    ChainSettings, DEFAULT_RPC_URL, RONIN_CHAIN_ID,
};
use scholar_payouts::interfaces::json::config_reader::ConfigReader;
use scholar_payouts::interfaces::prompt::{AutoApprove, InteractivePrompt};
use scholar_payouts::telemetry::{self, LogFormat};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payments file, in either the legacy or the splits layout
    payments_file: PathBuf,

    /// Secrets file mapping scholarship accounts to their private keys
    secrets_file: PathBuf,

    /// Pay every scholar without asking for confirmation
    #[arg(long, short = 'y', env = "SCHOLAR_PAYOUTS_YES")]
    yes: bool,

    #[arg(long, env = "SCHOLAR_PAYOUTS_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    #[arg(long, env = "SCHOLAR_PAYOUTS_CHAIN_ID", default_value_t = RONIN_CHAIN_ID)]
    chain_id: u64,

    /// Gas price in wei
    #[arg(long, env = "SCHOLAR_PAYOUTS_GAS_PRICE", default_value_t = 0)]
    gas_price: u64,

    /// Token contract ABI (JSON). Defaults to the bundled SLP ABI.
    #[arg(long, env = "SCHOLAR_PAYOUTS_ABI")]
    abi: Option<PathBuf>,

    /// Directory of the dated results log
    #[arg(long, env = "SCHOLAR_PAYOUTS_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    #[arg(long, env = "SCHOLAR_PAYOUTS_POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Seconds to wait for a receipt before replacing the transaction
    #[arg(long, env = "SCHOLAR_PAYOUTS_RECEIPT_TIMEOUT_SECS", default_value_t = 120)]
    receipt_timeout_secs: u64,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, env = "SCHOLAR_PAYOUTS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[arg(long, env = "SCHOLAR_PAYOUTS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(cli.log_format, &cli.log_level);

    let payments = ConfigReader::open(&cli.payments_file)?.payments()?;
    let secrets = ConfigReader::open(&cli.secrets_file)?.secrets()?;
    let payouts = match validator::validate(&payments, &secrets) {
        Ok(payouts) => payouts,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    let abi = match &cli.abi {
        Some(path) => std::fs::read_to_string(path).into_diagnostic()?,
        None => BUNDLED_SLP_ABI.to_string(),
    };
    let settings = ChainSettings {
        rpc_url: cli.rpc_url,
        chain_id: cli.chain_id,
        gas_price: cli.gas_price,
        ..ChainSettings::default()
    };
    let contract = TokenContract::from_abi(settings.token_contract, &abi)?;
    let chain = RoninRpcClient::new(settings, contract);

    let results = FileResultsLog::open(&cli.log_dir)?;
    tracing::info!(path = %results.path().display(), "Writing results log");

    let confirmation: ConfirmationBox = if cli.yes {
        Box::new(AutoApprove)
    } else {
        Box::new(InteractivePrompt)
    };

    let mut manager = PaymentsManager::new(
        payouts,
        Box::new(chain),
        Box::new(results),
        confirmation,
        ExecutionSettings {
            poll_interval: Duration::from_millis(cli.poll_interval_ms),
            receipt_timeout: Duration::from_secs(cli.receipt_timeout_secs),
        },
    );
    manager.run().await;

    Ok(())
}
