//! Simulated live round dealer.
//!
//! Runs a RoundActor for one table with simulated bettors and a simulated
//! card shoe, logging every round and optionally printing events as JSON.

mod config;
mod dealer;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Error;
use ctrlc::set_handler;
use live_round::{
    events::{EventBus, RoundEvent},
    table::RoundActor,
};
use log::info;
use pico_args::Arguments;

use config::DealerConfig;
use dealer::Dealer;

const HELP: &str = "\
Run a simulated live baccarat table

USAGE:
  lr_dealer [OPTIONS]

OPTIONS:
  --table      ID          Table identifier            [default: env TABLE_ID or table-1]
  --rounds     N           Rounds to run, 0 = forever  [default: env ROUNDS or 0]

FLAGS:
  --json                   Print every round event as a JSON line on stdout
  -h, --help               Print help information

ENVIRONMENT:
  DEALER_ID                Dealer identifier
  BETTING_SECS             Betting window in seconds
  DEALING_SECS             Dealing phase in seconds
  RESULT_SECS              Result display in seconds
  RESULT_GRACE_SECS        Extra wait for a late result
  RESULT_POLICY            authoritative | simulated
  CATEGORY_MAX             Stake ceiling per bet category
  ROUND_MAX                Stake ceiling per round
  BETTORS                  Number of simulated bettors
  DROP_RESULT_RATE         Probability the shoe never reports a result (0..1)
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let json = pargs.contains("--json");
    let table_id: Option<String> = pargs.opt_value_from_str("--table")?;
    let rounds: Option<u64> = pargs.opt_value_from_str("--rounds")?;

    let config = DealerConfig::from_env(table_id, rounds)?;
    config.validate()?;

    // First Ctrl-C finishes the current round, the second exits immediately.
    let stopping = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stopping);
    set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(0);
        }
    })?;

    env_logger::builder().format_target(false).init();
    info!(
        "Starting table {} ({} policy, {} bettors)",
        config.table_id, config.round.result_policy, config.bettors
    );

    let bus = Arc::new(EventBus::new());
    if json {
        bus.subscribe_all(Arc::new(|event: &RoundEvent| {
            match event.to_json() {
                Ok(line) => println!("{line}"),
                Err(e) => log::error!("Failed to encode {event}: {e}"),
            }
        }));
    }

    let (actor, handle) = RoundActor::new(config.table_id.clone(), config.round.clone(), bus);
    let actor_task = tokio::spawn(actor.run());

    let mut dealer = Dealer::attach(
        handle.clone(),
        config.dealer_id.clone(),
        config.betting_secs,
        config.bettors,
        config.drop_result_rate,
    )
    .await?;

    let mut played = 0u64;
    while !stopping.load(Ordering::SeqCst) && (config.rounds == 0 || played < config.rounds) {
        dealer.run_round().await?;
        played += 1;
    }

    let state = handle.state().await?;
    let stats = state.stats;
    info!(
        "Table {} closing after {} rounds: banker {}, player {}, tie {}, degraded {}",
        state.table_id,
        played,
        stats.banker_wins,
        stats.player_wins,
        stats.ties,
        stats.degraded
    );

    handle.close().await?;
    actor_task.await?;

    Ok(())
}
