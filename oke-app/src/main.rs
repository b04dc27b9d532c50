//! oke-app - Headless driver for the Oke application state
//!
//! Replays action logs through the store, manages the saved creator draft
//! and connects a key-backed wallet.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use liboke::app::{Action, AppState, Store};
use liboke::config::deployer_key_from_env;
use liboke::error::WalletError;
use liboke::logging::LoggingConfig;
use liboke::persistence::{persist_creator_state, restore_creator_state, CreatorStore};
use liboke::services::effects::connect_wallet;
use liboke::services::local_wallet::LocalKeyWallet;
use liboke::types::{AssetFile, CreatorStatePatch};
use liboke::{Config, FileCreatorStore, OkeError, Result};

#[derive(Parser, Debug)]
#[command(name = "oke-app")]
#[command(version)]
#[command(about = "Drive the Oke application state from the command line")]
#[command(long_about = "\
oke-app - Drive the Oke application state from the command line

DESCRIPTION:
    oke-app runs the same store and reducer as the Oke front end without a
    browser. Actions are JSON objects of the form
    {\"type\": \"SET_VIEW\", \"payload\": \"creator\"}.

COMMANDS:
    replay   Apply a log of actions (one JSON object per line) and print the state
    draft    Show, edit or clear the saved creator draft
    connect  Connect a wallet backed by PRIVATE_KEY and print its state

USAGE EXAMPLES:
    # Replay a log from a file
    oke-app replay session.jsonl

    # Replay from stdin and print the final state as JSON
    cat session.jsonl | oke-app replay --format json

    # Update the saved draft
    oke-app draft set --transcript \"first verse\" --file ./take1.wav

    # Check the deployer key against the sepolia endpoint
    PRIVATE_KEY=0x... oke-app connect --network sepolia

CONFIGURATION:
    Configuration file: ~/.config/oke/config.toml
    Draft location: ~/.local/share/oke/views/creator.json

    Override with environment variables:
        OKE_CONFIG      - Path to config file
        OKE_DATA_DIR    - Data directory
        OKE_LOG_FORMAT  - text, json or pretty
        OKE_LOG_LEVEL   - Log filter (default: warn)

EXIT CODES:
    0 - Success
    1 - Operation failed
    2 - Wallet or signer error
    3 - Invalid input (unknown action, bad format, etc.)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a log of actions and print the resulting state
    Replay {
        /// Action log, one JSON object per line (reads stdin if omitted or "-")
        input: Option<String>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Start from the saved creator draft and save changes back
        #[arg(long)]
        with_draft: bool,
    },

    /// Manage the saved creator draft
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Connect a key-backed wallet
    Connect {
        /// Network name from the configuration
        #[arg(short, long, default_value = "sepolia")]
        network: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    /// Print the saved draft
    Show {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Update fields of the saved draft
    Set {
        #[arg(short, long)]
        transcript: Option<String>,

        /// Attach a file
        #[arg(long, conflicts_with = "no_file")]
        file: Option<PathBuf>,

        /// Remove the attached file
        #[arg(long)]
        no_file: bool,

        #[arg(long)]
        options_checked: Option<bool>,
    },

    /// Delete the saved draft
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env(cli.verbose);
    if std::env::var("OKE_LOG_LEVEL").is_err() {
        logging.level = "warn".to_string();
    }
    logging.init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Replay {
            input,
            format,
            with_draft,
        } => {
            validate_format(&format)?;
            cmd_replay(input.as_deref(), &format, with_draft)
        }
        Commands::Draft { command } => cmd_draft(command),
        Commands::Connect { network, format } => {
            validate_format(&format)?;
            cmd_connect(&network, &format).await
        }
    }
}

fn validate_format(format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        return Err(OkeError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            format
        )));
    }
    Ok(())
}

fn draft_store() -> Result<FileCreatorStore> {
    let config = Config::load()?;
    Ok(FileCreatorStore::new(&config.data_dir()))
}

/// Apply every action in the log, stopping at the first bad line
fn cmd_replay(input: Option<&str>, format: &str, with_draft: bool) -> Result<()> {
    let reader: Box<dyn Read> = match input {
        None | Some("-") => Box::new(std::io::stdin()),
        Some(path) => Box::new(std::fs::File::open(path).map_err(|e| {
            OkeError::InvalidInput(format!("Cannot open action log '{}': {}", path, e))
        })?),
    };

    let mut store = Store::default();
    if with_draft {
        let disk = draft_store()?;
        restore_creator_state(&mut store, &disk)?;
        persist_creator_state(&mut store, Arc::new(disk));
    }

    let mut applied = 0usize;
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.map_err(|e| OkeError::InvalidInput(format!("Cannot read action log: {}", e)))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let action = Action::from_json(trimmed).map_err(|e| {
            tracing::error!(line = index + 1, error = %e, "rejected action");
            OkeError::from(e)
        })?;
        store.dispatch(action)?;
        applied += 1;
    }

    tracing::info!(applied, "replay finished");
    print_state(store.state(), format);
    Ok(())
}

fn print_state(state: &AppState, format: &str) {
    if format == "json" {
        match serde_json::to_string_pretty(state) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!(error = %e, "failed to serialize state"),
        }
        return;
    }

    println!("view: {}", state.view);
    match state.web3_state.address() {
        Some(address) => println!(
            "wallet: {} (chain {})",
            address,
            state
                .web3_state
                .chain_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "?".to_string())
        ),
        None => println!("wallet: disconnected"),
    }
    if let Some(email) = &state.email {
        println!("email: {}", email);
    }
    println!(
        "items: {}{}",
        state.items.len(),
        if state.is_loading_collection {
            " (loading)"
        } else {
            ""
        }
    );
    if let Some(item) = &state.selected_item {
        println!("selected: {} ({})", item.id, item.name);
    }
    println!("transcript: {}", state.creator_state.transcript);
    if let Some(file) = &state.creator_state.file {
        println!("file: {} ({} bytes)", file.name, file.size());
    }
    println!("mint modal: {}", if state.is_minting() { "open" } else { "closed" });
    if let Some(status) = &state.minting_status {
        println!("status: {}", status.message);
    }
    if let Some(error) = &state.network_error {
        println!("network error: {}", error);
    }
}

fn cmd_draft(command: DraftCommand) -> Result<()> {
    let disk = draft_store()?;

    match command {
        DraftCommand::Show { format } => {
            validate_format(&format)?;
            draft_show(&disk, &format)
        }
        DraftCommand::Set {
            transcript,
            file,
            no_file,
            options_checked,
        } => {
            let file = match (no_file, file) {
                (true, _) => Some(None),
                (false, Some(path)) => Some(Some(load_asset(&path)?)),
                (false, None) => None,
            };
            let patch = CreatorStatePatch {
                file,
                transcript,
                options_checked,
            };

            if patch.is_empty() {
                return Err(OkeError::InvalidInput(
                    "Nothing to change: pass --transcript, --file, --no-file or --options-checked"
                        .to_string(),
                ));
            }

            let mut store = Store::default();
            restore_creator_state(&mut store, &disk)?;
            persist_creator_state(&mut store, Arc::new(disk.clone()));
            store.dispatch(Action::UpdateCreatorState(patch))?;

            // An unchanged draft is never written by the observer
            if disk.load()?.is_none() {
                disk.save(&store.state().creator_state)?;
            }
            println!("Draft saved to {}", disk.path().display());
            Ok(())
        }
        DraftCommand::Clear => {
            disk.clear()?;
            println!("Draft cleared");
            Ok(())
        }
    }
}

fn load_asset(path: &Path) -> Result<AssetFile> {
    AssetFile::from_path(path).map_err(|e| {
        OkeError::InvalidInput(format!("Cannot read '{}': {}", path.display(), e))
    })
}

fn draft_show(disk: &FileCreatorStore, format: &str) -> Result<()> {
    let draft = disk.load()?;

    if format == "json" {
        let saved_at = disk.saved_at()?.map(|t| t.to_rfc3339());
        let json = serde_json::json!({
            "path": disk.path().display().to_string(),
            "savedAt": saved_at,
            "draft": draft,
        });
        println!("{}", json);
        return Ok(());
    }

    match draft {
        None => println!("No saved draft"),
        Some(draft) => {
            if let Some(saved_at) = disk.saved_at()? {
                println!("saved: {}", saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            println!("transcript: {}", draft.transcript);
            match &draft.file {
                Some(file) => println!("file: {} ({}, {} bytes)", file.name, file.mime_type, file.size()),
                None => println!("file: none"),
            }
            println!("options checked: {}", draft.options_checked);
        }
    }
    Ok(())
}

async fn cmd_connect(network_name: &str, format: &str) -> Result<()> {
    let config = Config::load()?;
    let network = config.network(network_name)?.clone();
    let key = deployer_key_from_env().ok_or_else(|| {
        WalletError::Unavailable("no signing key configured (set PRIVATE_KEY)".to_string())
    })?;

    let wallet = LocalKeyWallet::new(network_name, network, key);
    let mut store = Store::default();
    let dispatcher = store.dispatcher();

    let connected = connect_wallet(&dispatcher, &wallet).await;
    store.drain()?;

    if !connected {
        let reason = store
            .state()
            .network_error
            .clone()
            .unwrap_or_else(|| "connection failed".to_string());
        return Err(WalletError::Unavailable(reason).into());
    }

    if format == "json" {
        match serde_json::to_string_pretty(&store.state().web3_state) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!(error = %e, "failed to serialize wallet state"),
        }
    } else {
        let web3 = &store.state().web3_state;
        println!("address: {}", web3.address().unwrap_or("-"));
        println!(
            "chain id: {}",
            web3.chain_id().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
        );
        if let Some(provider) = web3.provider() {
            println!("endpoint: {}", provider.endpoint);
        }
    }
    Ok(())
}
