use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lectern_core::{ParticipantId, RoomId};
use lectern_server::{
    AppState, EngagementPolicy, MemoryGateway, RoomManager, SignalingService, run_sweep,
    ws_handler,
};

/// Live classroom signaling and engagement coordinator.
#[derive(Parser)]
#[command(name = "lectern", version)]
struct Args {
    /// Address to bind the signaling endpoint on.
    #[arg(long, default_value = "127.0.0.1:8443")]
    listen: SocketAddr,

    /// JSON file mapping room ids to their watcher rosters.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Seconds between presence sweep ticks.
    #[arg(long, default_value_t = 60)]
    sweep_interval_secs: u64,

    /// Continuous membership (seconds) required for the presence bonus.
    #[arg(long, default_value_t = 1800)]
    duration_threshold_secs: u64,

    /// Credit granted once the presence threshold is crossed.
    #[arg(long, default_value_t = 100)]
    bonus_amount: i64,

    /// Credit deducted per disengagement signal.
    #[arg(long, default_value_t = 1)]
    signal_penalty: i64,

    /// Label treated as disengagement; repeat to override the default set.
    #[arg(long = "disengagement-label", value_name = "LABEL")]
    disengagement_labels: Vec<String>,
}

impl Args {
    fn policy(&self) -> EngagementPolicy {
        let mut policy = EngagementPolicy {
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
            duration_threshold: Duration::from_secs(self.duration_threshold_secs),
            bonus_amount: self.bonus_amount,
            signal_penalty: self.signal_penalty,
            ..EngagementPolicy::default()
        };
        if !self.disengagement_labels.is_empty() {
            policy.disengagement_labels = self.disengagement_labels.iter().cloned().collect();
        }
        policy
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let policy = args.policy();

    let gateway = Arc::new(MemoryGateway::new());
    if let Some(path) = &args.roster {
        let count = seed_rosters(&gateway, path)?;
        info!("Seeded {} room roster(s) from {}", count, path.display());
    }

    let service = SignalingService::new();
    let rooms = RoomManager::new(policy.clone(), Arc::new(service.clone()), gateway);

    tokio::spawn(run_sweep(rooms.clone(), policy.sweep_interval));

    let state = AppState { service, rooms };
    let app = Router::new().route("/ws", get(ws_handler)).with_state(state);

    info!("Listening on {}", args.listen);
    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    axum::serve(listener, app)
        .await
        .context("signaling server exited")?;

    Ok(())
}

fn seed_rosters(gateway: &MemoryGateway, path: &PathBuf) -> Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading roster file {}", path.display()))?;
    let rosters: HashMap<String, Vec<String>> =
        serde_json::from_str(&raw).context("parsing roster file")?;

    let count = rosters.len();
    for (room, members) in rosters {
        gateway.seed_room(
            RoomId::from(room),
            members.into_iter().map(ParticipantId::from),
        );
    }
    Ok(count)
}
