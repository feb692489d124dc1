use crate::api::ChainView;
use crate::config::Config;
use crate::core::Blockchain;
use crate::mining::Miner;
use crate::wallet::Wallet;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "minichaind")]
#[command(about = "Minichain - a single-node proof-of-work UTXO ledger")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override the proof-of-work difficulty")]
    pub difficulty: Option<u32>,

    #[arg(long, help = "Override the amount credited by the genesis block")]
    pub genesis_amount: Option<u64>,

    #[arg(long, help = "Abandon mining after this many seconds")]
    pub mining_timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transfer coins between two fresh wallets and show the resulting chain
    Demo {
        #[arg(long, default_value_t = 10, help = "Amount to transfer")]
        amount: u64,

        #[arg(long, help = "Print the chain as JSON")]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Debug)]
pub struct DemoReport {
    pub sender_balance: u64,
    pub recipient_balance: u64,
    pub chain: ChainView,
}

impl Cli {
    /// Loads the configured file and applies any command line overrides.
    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let path = self.config.clone().unwrap_or_else(Config::default_path);
        let mut config =
            Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))?;

        if let Some(difficulty) = self.difficulty {
            config.ledger.difficulty = difficulty;
        }
        if let Some(amount) = self.genesis_amount {
            config.ledger.genesis_amount = amount;
        }
        if let Some(seconds) = self.mining_timeout {
            config.mining.timeout_seconds = Some(seconds);
        }

        config.validate()?;
        Ok(config)
    }
}

pub async fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let _ = if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).try_init()
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init()
    };

    let config = cli.resolve_config()?;

    match cli.command {
        Commands::Demo { amount, json } => {
            let report = run_demo(&config, amount).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report.chain)?);
            } else {
                println!("Height:     {}", report.chain.height);
                println!("Difficulty: {}", report.chain.difficulty);
                for block in &report.chain.blocks {
                    println!("  {} <- {} (nonce {})", block.hash, block.previous_hash, block.nonce);
                }
                println!("Sender balance:    {}", report.sender_balance);
                println!("Recipient balance: {}", report.recipient_balance);
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Funds one wallet through genesis, sends `amount` to another and mines the
/// transfer onto the chain.
pub async fn run_demo(config: &Config, amount: u64) -> anyhow::Result<DemoReport> {
    let sender = Wallet::new()?;
    let recipient = Wallet::new()?;

    let blockchain = Arc::new(Blockchain::new(
        sender.address().clone(),
        config.ledger.genesis_amount,
        config.ledger.difficulty,
    )?);
    let miner = Miner::for_chain(&blockchain, &config.mining);

    log::info!("Sending {} from {} to {}", amount, sender.address(), recipient.address());

    let transaction = sender.transfer(&blockchain, recipient.address(), amount)?;
    let block = miner
        .mine(blockchain.prepare_block(transaction))
        .await
        .context("Failed to mine transfer block")?;
    blockchain.add(block)?;

    Ok(DemoReport {
        sender_balance: sender.balance(&blockchain),
        recipient_balance: recipient.balance(&blockchain),
        chain: ChainView::of(&blockchain),
    })
}
