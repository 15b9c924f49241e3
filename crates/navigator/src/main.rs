use std::{error::Error, path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use model::{PermissionState, SessionEvent, SessionSnapshot};
use navigation::{
    position::ReplayPositionSource, Permission, SessionConfig, SessionHandle,
    SubscriptionOptions,
};
use osm::{NominatimGeocoder, OsmApiClient, OsmConfig, OsrmRouter};
use tokio::sync::{broadcast, watch};

/// Drives a navigation session from a recorded track and prints every state
/// change and event as a JSON line.
#[derive(Debug, Parser)]
#[command(name = "navigator", version)]
struct Args {
    /// CSV track with `latitude,longitude[,accuracy,timestamp]` columns
    #[arg(long)]
    fixes: PathBuf,

    /// Address to navigate to
    #[arg(long)]
    destination: Option<String>,

    /// Start navigating as soon as the first route arrives
    #[arg(long)]
    start: bool,

    /// Delay between replayed fixes
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Minimum distance between applied fixes in meters
    #[arg(long, default_value_t = 5.0)]
    min_distance: f64,

    /// Minimum time between position-driven route refreshes
    #[arg(long)]
    refresh_interval_ms: Option<u64>,

    /// Answer the permission prompt with "denied"
    #[arg(long)]
    deny_permission: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(why) = run(args).await {
        log::error!("{}", why);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    // services
    let osm_config = OsmConfig::from_env();
    let client = Arc::new(OsmApiClient::new(&osm_config)?);
    let interval = Duration::from_millis(args.interval_ms);
    let permission = if args.deny_permission {
        Permission::Denied
    } else {
        Permission::Granted
    };
    let source =
        ReplayPositionSource::from_path(&args.fixes, interval)?.with_permission(permission);
    let replay_time = interval * source.fixes().len() as u32;
    log::info!(
        "replaying {} fixes from {}",
        source.fixes().len(),
        args.fixes.display()
    );

    // session
    let config = SessionConfig {
        subscription: SubscriptionOptions {
            min_distance_meters: args.min_distance,
            ..Default::default()
        },
        route_refresh_interval_ms: args.refresh_interval_ms,
        ..Default::default()
    };
    let handle = SessionHandle::spawn(
        config,
        Arc::new(NominatimGeocoder::new(client.clone())),
        Arc::new(OsrmRouter::new(client)),
        Arc::new(source),
    );
    tokio::spawn(print_events(handle.events()));
    tokio::spawn(print_snapshots(handle.subscribe()));

    handle.request_permission_and_begin().await?;
    if let Some(destination) = args.destination {
        handle.submit_destination(destination).await?;
    }

    let mut snapshots = handle.subscribe();
    let mut started = false;
    let deadline = tokio::time::sleep(replay_time + Duration::from_secs(5));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if snapshot.permission == PermissionState::Denied {
                    break;
                }
                if args.start && !started && snapshot.route.is_some() {
                    started = true;
                    handle.start().await?;
                }
            }
        }
    }

    handle.close().await?;
    Ok(())
}

async fn print_snapshots(mut snapshots: watch::Receiver<SessionSnapshot>) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        match serde_json::to_string(&snapshot) {
            Ok(line) => println!("{}", line),
            Err(why) => log::error!("can not serialize snapshot: {}", why),
        }
    }
}

async fn print_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::Error(error)) if error.is_failure() => {
                eprintln!("error: {}", error);
            }
            Ok(SessionEvent::Error(notice)) => eprintln!("note: {}", notice),
            Ok(event) => match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(why) => log::error!("can not serialize event: {}", why),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
