//! oke-deploy - Deploy the Oke contracts
//!
//! One-shot deployment of OkeNFT, OkeSBT and Minter, followed by granting
//! each token's MINTER_ROLE to the minter.

use std::path::PathBuf;

use alloy::primitives::{utils::parse_ether, Address};
use clap::Parser;
use liboke::config::{deployer_key_from_env, expand_path};
use liboke::deploy::{chain, run_deployment, ArtifactStore, DeployPlan, DeploymentReport};
use liboke::error::DeployError;
use liboke::logging::LoggingConfig;
use liboke::{Config, OkeError, Result};

#[derive(Parser, Debug)]
#[command(name = "oke-deploy")]
#[command(version)]
#[command(about = "Deploy the Oke NFT, SBT and Minter contracts")]
#[command(long_about = "\
oke-deploy - Deploy the Oke NFT, SBT and Minter contracts

DESCRIPTION:
    Deploys OkeNFT, OkeSBT and Minter from compiled Hardhat artifacts, then
    grants MINTER_ROLE on both token contracts to the Minter. Every step is
    logged; the first failed transaction aborts the run. Nothing is retried,
    so a failed run has to be started again from scratch.

USAGE EXAMPLES:
    # Deploy to sepolia
    PRIVATE_KEY=0x... oke-deploy

    # Deploy to a local Hardhat node with a custom artifacts directory
    PRIVATE_KEY=0x... oke-deploy --network hardhat --artifacts ./build/artifacts

CONFIGURATION:
    Configuration file: ~/.config/oke/config.toml

    Environment variables:
        PRIVATE_KEY        - Deployer key (required)
        SEPOLIA_RPC_URL    - Overrides networks.sepolia.url (likewise for other networks)
        ETHERSCAN_API_KEY  - Explorer key for sepolia and the [explorer] fallback
        POLYGONSCAN_API_KEY - Explorer key for mumbai
        OKE_CONFIG         - Path to config file
        OKE_LOG_FORMAT     - text, json or pretty
        OKE_LOG_LEVEL      - Log filter (default: info)

EXIT CODES:
    0 - Success
    1 - Deployment failed
    2 - Missing or invalid deployer key
    3 - Invalid input
")]
struct Cli {
    /// Network name from the configuration
    #[arg(short, long, default_value = "sepolia")]
    network: String,

    /// Path to config file (overrides OKE_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hardhat artifacts directory (overrides paths.artifacts)
    #[arg(short, long)]
    artifacts: Option<String>,

    /// Admin of all three contracts (defaults to the deployer)
    #[arg(long)]
    admin: Option<Address>,

    /// Receives mint fees (defaults to the deployer)
    #[arg(long)]
    fee_recipient: Option<Address>,

    /// Mint fee in ether
    #[arg(long, default_value = "0.01")]
    mint_fee: String,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "deployment aborted");
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.format != "text" && cli.format != "json" {
        return Err(OkeError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            cli.format
        )));
    }

    let mint_fee = parse_ether(&cli.mint_fee).map_err(|e| {
        OkeError::InvalidInput(format!("Invalid mint fee '{}': {}", cli.mint_fee, e))
    })?;

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?.with_env_overrides(),
        None => Config::load()?,
    };
    let network = config.network(&cli.network)?;
    let key = deployer_key_from_env().ok_or(DeployError::MissingSigner)?;

    let artifacts_dir = match &cli.artifacts {
        Some(dir) => expand_path(dir),
        None => config.artifacts_dir(),
    };

    let plan = DeployPlan {
        admin: cli.admin,
        fee_recipient: cli.fee_recipient,
        mint_fee,
        expected_chain_id: Some(network.chain_id),
        ..DeployPlan::default()
    };

    tracing::info!(
        network = %cli.network,
        chain_id = network.chain_id,
        explorer_key = config.explorer_api_key(&cli.network).is_some(),
        artifacts = %artifacts_dir.display(),
        "starting deployment"
    );

    let client = chain::connect(network, &key)?;
    let report = run_deployment(&client, &ArtifactStore::new(artifacts_dir), &plan).await?;

    output_report(&report, &cli.network, &cli.format);
    Ok(())
}

fn output_report(report: &DeploymentReport, network: &str, format: &str) {
    if format == "json" {
        let json = serde_json::json!({
            "network": network,
            "chainId": report.chain_id,
            "deployer": report.deployer.to_string(),
            "okeNFT": report.oke_nft.address.to_string(),
            "okeSBT": report.oke_sbt.address.to_string(),
            "minter": report.minter.address.to_string(),
            "transactions": {
                "okeNFT": report.oke_nft.tx_hash.to_string(),
                "okeSBT": report.oke_sbt.tx_hash.to_string(),
                "minter": report.minter.tx_hash.to_string(),
                "grantNFT": report.nft_grant_tx.to_string(),
                "grantSBT": report.sbt_grant_tx.to_string(),
            },
        });
        println!("{}", json);
    } else {
        println!("{}", report);
    }
}
