//! Headless Duel Runner
//!
//! Runs a baseline-vs-baseline duel to completion and prints the result,
//! either as JSON for downstream tooling or as readable text.

use clap::Parser;
use serde::Serialize;

use duelcore::catalog::ActionCatalog;
use duelcore::combat::{CombatSession, LogEntry, SessionOutcome};
use duelcore::core::config::SessionConfig;
use duelcore::core::error::Result;
use duelcore::core::types::Btu;
use duelcore::decision::{drive, BaselineProvider, DecisionProvider};
use duelcore::timing;

/// Headless Duel Runner - baseline duels for engine validation
#[derive(Parser, Debug)]
#[command(name = "duel_runner")]
#[command(about = "Run a baseline-vs-baseline duel and print the outcome")]
struct Args {
    /// Name of the first combatant (joins as challenger)
    #[arg(long, default_value = "challenger")]
    challenger: String,

    /// Name of the second combatant (joins as defender)
    #[arg(long, default_value = "defender")]
    defender: String,

    /// Session duration cap in milliseconds
    #[arg(long, default_value_t = 100_000)]
    duration_ms: i64,

    /// Separation between the combatants at the start
    #[arg(long, default_value_t = 60.0)]
    starting_distance: f32,

    /// Width of the strip the duel is fought on
    #[arg(long, default_value_t = 100.0)]
    max_distance: f32,

    /// Optional TOML file with action catalog overrides
    #[arg(long)]
    catalog: Option<std::path::PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every retained log entry, not just the summary
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct DuelResult {
    outcome: SessionOutcome,
    clock: Btu,
    challenger: CombatantResult,
    defender: CombatantResult,
    entries_recorded: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    log: Option<Vec<LogEntry>>,
}

#[derive(Serialize)]
struct CombatantResult {
    name: String,
    health: u32,
    stamina: u32,
    blocking_power: u32,
    position: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duelcore=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => ActionCatalog::from_file(path)?,
        None => ActionCatalog::builtin(),
    };

    let config = SessionConfig {
        duration_cap: timing::to_base_units(args.duration_ms)?,
        starting_distance: args.starting_distance,
        max_distance: args.max_distance,
        ..SessionConfig::default()
    };

    let mut session = CombatSession::new(config, catalog);
    let challenger = session.add_actor(duelcore::combat::ActorSpec {
        name: args.challenger.clone(),
        ..Default::default()
    })?;
    let defender = session.add_actor(duelcore::combat::ActorSpec {
        name: args.defender.clone(),
        ..Default::default()
    })?;
    session.start()?;

    let mut left = BaselineProvider::new();
    let mut right = BaselineProvider::new();
    let outcome = drive(
        &mut session,
        &mut [
            (challenger, &mut left as &mut dyn DecisionProvider),
            (defender, &mut right),
        ],
    )?;

    let view = session.snapshot();
    let combatant = |id| {
        let snap = view.actor(id).cloned().unwrap_or_else(|| {
            panic!("combatant {id} missing from final snapshot");
        });
        CombatantResult {
            name: snap.name,
            health: snap.health,
            stamina: snap.stamina,
            blocking_power: snap.blocking_power,
            position: snap.position,
        }
    };
    let result = DuelResult {
        outcome,
        clock: session.clock(),
        challenger: combatant(challenger),
        defender: combatant(defender),
        entries_recorded: session.log().total_recorded(),
        log: args.verbose.then(|| session.log().entries()),
    };

    match args.format.as_str() {
        "text" => print_text(&result),
        _ => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

fn print_text(result: &DuelResult) {
    match result.outcome {
        SessionOutcome::Victory { winner } => println!("Victory for {winner}"),
        SessionOutcome::Draw => println!("Draw: both combatants fell"),
        SessionOutcome::Timeout => println!("Timeout: nobody finished the job"),
    }
    println!("clock: {} BTU", result.clock);
    for side in [&result.challenger, &result.defender] {
        println!(
            "  {}: {} hp, {} stamina, {} guard, at {:.1}",
            side.name, side.health, side.stamina, side.blocking_power, side.position
        );
    }
    println!("log entries recorded: {}", result.entries_recorded);
    if let Some(log) = &result.log {
        for entry in log {
            println!("  {entry:?}");
        }
    }
}
