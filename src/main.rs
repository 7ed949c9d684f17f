//! HEAT claims CLI
//!
//! Operates on a JSON state snapshot: each invocation locks the state file,
//! loads it, runs a single operation through the engine, prints the emitted
//! events and writes the state back before releasing the lock.

use std::path::{Path, PathBuf};

use alloy_primitives::{Address, U256};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use heat_burn_claims::config::{
    init_state, load_attestations, load_state, record_attestation, with_locked_engine, HeatConfig,
};
use heat_burn_claims::verifier::ProofVerifier;
use heat_burn_claims::{Claim, HeatEngine, PublicInputs, Role};

#[derive(Parser)]
#[command(
    name = "heat-claims",
    about = "Authorize HEAT mints from source-chain burn proofs",
    version,
    long_about = r#"Authorize HEAT mints from source-chain burn proofs.

Each burn proof can be claimed exactly once. Claims mint one of two fixed
amounts, capped by a hard supply ceiling. Collected fees are split into
burn (8%), treasury (2%) and distribution (90%) shares."#
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Owner,
    FeeCollector,
    Treasury,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Owner => Role::Owner,
            RoleArg::FeeCollector => Role::FeeCollector,
            RoleArg::Treasury => Role::Treasury,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a genesis state file from a configuration file
    Init {
        /// JSON configuration with role holders
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Where to write the state
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Submit a burn-proof claim
    #[command(long_about = r#"Submit a claim JSON file.

The claim's proof is checked against the attestation list: a JSON file of
proof digests that passed STARK verification off-line."#)]
    Claim {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        /// Claim JSON (secret, proof, public_inputs, recipient, tier)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Attested proof digests
        #[arg(short, long, value_name = "FILE")]
        attestations: Option<PathBuf>,
    },

    /// Record a claim's proof as verified in an attestation file
    Attest {
        /// Claim JSON whose proof was verified
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Attestation file to update (created if missing)
        #[arg(short, long, value_name = "FILE")]
        attestations: PathBuf,
    },

    /// Split a collected amount into burn / treasury / distribution shares
    Collect {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        /// Fee collector address
        #[arg(long)]
        caller: Address,

        /// Account the fees are collected from
        #[arg(long)]
        account: Address,

        /// Collected amount in HEAT base units
        #[arg(long)]
        amount: U256,

        /// Consume this spender's allowance over `account` first
        #[arg(long)]
        spender: Option<Address>,
    },

    /// Treasury burns part of its own balance
    BurnTreasury {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        #[arg(long)]
        caller: Address,

        #[arg(long)]
        amount: U256,
    },

    /// Transfer HEAT
    Transfer {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        #[arg(long)]
        caller: Address,

        #[arg(long)]
        to: Address,

        #[arg(long)]
        amount: U256,
    },

    /// Set an allowance
    Approve {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        #[arg(long)]
        caller: Address,

        #[arg(long)]
        spender: Address,

        #[arg(long)]
        amount: U256,
    },

    /// Hand a privileged role to a new holder (zero address clears it)
    SetRole {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        #[arg(long)]
        caller: Address,

        #[arg(long, value_enum)]
        role: RoleArg,

        #[arg(long)]
        holder: Address,
    },

    /// Halt all mutating operations
    Halt {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        #[arg(long)]
        caller: Address,
    },

    /// Resume after a halt
    Resume {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,

        #[arg(long)]
        caller: Address,
    },

    /// Show supply, counters and role holders
    Status {
        #[arg(short, long, value_name = "FILE")]
        state: PathBuf,
    },

    /// Show the fixed protocol constants
    Info,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { config, state, force } => init_state_file(&config, &state, force)?,
        Commands::Claim { state, input, attestations } => {
            let claim = read_claim(&input)?;
            let verifier = load_attestations(attestations.as_deref())?;
            with_engine(&state, verifier, |engine| {
                let receipt = engine.submit_claim(&claim)?;
                println!("{}", serde_json::to_string_pretty(&receipt)?);
                Ok(())
            })?;
        }
        Commands::Attest { input, attestations } => attest_claim(&input, &attestations)?,
        Commands::Collect { state, caller, account, amount, spender } => {
            with_engine(&state, load_attestations(None)?, |engine| {
                let split = match spender {
                    Some(spender) => engine.collect_fees_from(caller, account, spender, amount)?,
                    None => engine.collect_fees(caller, account, amount)?,
                };
                println!("{}", serde_json::to_string_pretty(&split)?);
                Ok(())
            })?;
        }
        Commands::BurnTreasury { state, caller, amount } => {
            with_engine(&state, load_attestations(None)?, |engine| {
                Ok(engine.burn_from_treasury(caller, amount)?)
            })?;
        }
        Commands::Transfer { state, caller, to, amount } => {
            with_engine(&state, load_attestations(None)?, |engine| {
                Ok(engine.transfer(caller, to, amount)?)
            })?;
        }
        Commands::Approve { state, caller, spender, amount } => {
            with_engine(&state, load_attestations(None)?, |engine| {
                Ok(engine.approve(caller, spender, amount)?)
            })?;
        }
        Commands::SetRole { state, caller, role, holder } => {
            with_engine(&state, load_attestations(None)?, |engine| {
                Ok(engine.set_role(caller, role.into(), holder)?)
            })?;
        }
        Commands::Halt { state, caller } => {
            with_engine(&state, load_attestations(None)?, |engine| Ok(engine.halt(caller)?))?;
        }
        Commands::Resume { state, caller } => {
            with_engine(&state, load_attestations(None)?, |engine| Ok(engine.resume(caller)?))?;
        }
        Commands::Status { state } => show_status(&state)?,
        Commands::Info => show_system_info(),
    }

    Ok(())
}

fn init_state_file(config_path: &Path, state_path: &Path, force: bool) -> anyhow::Result<()> {
    let config = HeatConfig::load(config_path)?;
    init_state(&config, state_path, force)?;
    log::info!("genesis state written to {}", state_path.display());
    Ok(())
}

fn read_claim(path: &Path) -> anyhow::Result<Claim> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read claim file: {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| "Failed to parse claim JSON")
}

/// Run `op` as one locked cycle on the state file and print the events it
/// emitted as JSON lines
fn with_engine<V, F>(state_path: &Path, verifier: V, op: F) -> anyhow::Result<()>
where
    V: ProofVerifier + 'static,
    F: FnOnce(&HeatEngine) -> anyhow::Result<()>,
{
    with_locked_engine(state_path, verifier, |engine| {
        let outcome = op(engine);
        if let Err(e) = &outcome {
            if let Some(heat_err) = e.downcast_ref::<heat_burn_claims::HeatError>() {
                log::error!("operation rejected [{}]: {}", heat_err.error_code(), heat_err);
            }
        }

        for event in engine.drain_events() {
            println!("{}", serde_json::to_string(&event)?);
        }
        outcome
    })
}

fn attest_claim(input: &Path, attestations: &Path) -> anyhow::Result<()> {
    let claim = read_claim(input)?;
    let inputs = PublicInputs::from_slice(&claim.public_inputs)?;

    let (digest, recorded) = record_attestation(attestations, &claim.proof, &inputs.to_array())?;

    println!("Attested proof digest: {}", digest);
    println!("Attestations recorded:  {}", recorded);
    Ok(())
}

fn show_status(state_path: &Path) -> anyhow::Result<()> {
    let state = load_state(state_path)?;
    let counters = &state.counters;

    println!("HEAT Claims - Status");
    println!("====================");
    println!();
    println!("System status:            {:?}", state.status);
    println!("Total supply:             {}", state.ledger.total_supply());
    println!("Supply ceiling:           {}", state.ledger.max_supply());
    println!("Remaining headroom:       {}", state.ledger.headroom());
    println!("Holders:                  {}", state.ledger.holder_count());
    println!("Nullifiers consumed:      {}", state.nullifiers.len());
    println!();

    println!("Counters:");
    println!("  Total claims:           {}", counters.total_claims);
    println!("  Proofs verified:        {}", counters.total_proofs_verified);
    println!("  Total minted:           {}", counters.total_minted);
    println!("  Total burned:           {}", counters.total_burned);
    println!("  Collected for fees:     {}", counters.total_collected_for_fees);
    println!("  Burned for fees:        {}", counters.total_burned_for_fees);
    println!("  Burned by treasury:     {}", counters.total_burned_by_treasury);
    println!();

    println!("Roles:");
    for role in Role::ALL {
        match state.roles.holder(role) {
            Some(holder) => println!("  {:<22}{}", format!("{}:", role), holder),
            None => println!("  {:<22}(unassigned)", format!("{}:", role)),
        }
    }
    Ok(())
}

fn show_system_info() {
    use heat_burn_claims::constants::fee_params::*;
    use heat_burn_claims::constants::*;

    let unit = 10f64.powi(HEAT_DECIMALS as i32);

    println!("HEAT Claims - Protocol Constants");
    println!("================================");
    println!();

    println!("Tiers:");
    println!("  Standard burn:            {} base units", STANDARD_BURN_AMOUNT);
    println!("  Standard mint:            {} ({:.0} HEAT)", STANDARD_MINT_AMOUNT, STANDARD_MINT_AMOUNT as f64 / unit);
    println!("  Large burn:               {} base units", LARGE_BURN_AMOUNT);
    println!("  Large mint:               {} ({:.0} HEAT)", LARGE_MINT_AMOUNT, LARGE_MINT_AMOUNT as f64 / unit);
    println!("  HEAT per burn unit:       {}", HEAT_PER_BURN_UNIT);
    println!();

    println!("Supply:");
    println!("  Ceiling:                  {} ({:.0} HEAT)", MAX_SUPPLY, MAX_SUPPLY as f64 / unit);
    println!("  Decimals:                 {}", HEAT_DECIMALS);
    println!();

    println!("Claims:");
    println!("  Source network id:        {}", NETWORK_ID);
    println!("  Public inputs:            {} (nullifier, commitment, recipient hash, network id)", PUBLIC_INPUT_COUNT);
    println!("  Recipient binding:        keccak256(recipient address)");
    println!();

    println!("Fee split:");
    println!("  Burn:                     {}%", BURN_PERCENT);
    println!("  Treasury:                 {}%", TREASURY_PERCENT);
    println!("  Distribution:             {}% (absorbs rounding)", DISTRIBUTION_PERCENT);
}
