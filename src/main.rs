//! Wikitally - tallies the Wikidata contributions of editathon participants.
//!
//! Runs the fixed analysis sequence for the 2015 Donostia editathon:
//! the event window itself, then the month after the event split into
//! two sub-windows (the single-page cap of the `usercontribs` API makes
//! one month too coarse a window for busy participants).
//!
//! # Configuration
//!
//! - `WIKITALLY_API_BASE`: API endpoint (default: the public Wikidata API)
//! - `WIKITALLY_ROSTER`: roster file path (default: `data/participants.txt`)
//! - `WIKITALLY_REPORT_DIR`: report output directory (default: `reports`)

use std::env;
use std::path::Path;

use chrono::{TimeZone, Utc};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use wikitally::analyzer::Analysis;
use wikitally::data_sources::{RetryPolicy, WikidataClient};
use wikitally::model::TimeWindow;
use wikitally::roster::load_roster;

/// Default roster file if not specified via environment variable.
const DEFAULT_ROSTER_PATH: &str = "data/participants.txt";

/// Default report directory if not specified via environment variable.
const DEFAULT_REPORT_DIR: &str = "reports";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("wikitally=info".parse()?))
        .init();

    // Load configuration from environment
    let roster_path =
        env::var("WIKITALLY_ROSTER").unwrap_or_else(|_| DEFAULT_ROSTER_PATH.to_string());
    let report_dir =
        env::var("WIKITALLY_REPORT_DIR").unwrap_or_else(|_| DEFAULT_REPORT_DIR.to_string());

    let client = match env::var("WIKITALLY_API_BASE") {
        Ok(base) => WikidataClient::with_base_url(&base),
        Err(_) => WikidataClient::new(),
    };

    let roster = load_roster(&roster_path)?;
    info!(
        roster = %roster_path,
        participants = roster.len(),
        "starting editathon analysis"
    );

    std::fs::create_dir_all(&report_dir)?;
    let report_dir = Path::new(&report_dir);

    // Transient API failures are retried forever; this is an offline
    // batch with no deadline.
    let policy = RetryPolicy::default();

    // The event itself (CEST, 9:00-19:00 local, widened a little).
    let event = Analysis {
        window: TimeWindow::new(
            Utc.with_ymd_and_hms(2015, 7, 3, 7, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2015, 7, 3, 18, 0, 0).unwrap(),
        ),
        roster: roster.clone(),
        detail_path: report_dir.join("edits_byusers_editathon.txt"),
        summary_path: report_dir.join("report_global_edits.txt"),
    };
    let state = event.run(&client, &policy).await?;
    info!(
        all_edits = state.all_edits,
        item_edits = state.item_edits,
        "event window done"
    );

    // The month after the event, in two sub-windows.
    let aposteriori = Analysis {
        window: TimeWindow::new(
            Utc.with_ymd_and_hms(2015, 7, 3, 18, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2015, 7, 24, 18, 0, 0).unwrap(),
        ),
        roster: roster.clone(),
        detail_path: report_dir.join("edits_byusers_editathon_aposteriori.txt"),
        summary_path: report_dir.join("report_global_edits_aposteriori.txt"),
    };
    let state = aposteriori.run(&client, &policy).await?;
    info!(all_edits = state.all_edits, "first post-event window done");

    let aposteriori2 = Analysis {
        window: TimeWindow::new(
            Utc.with_ymd_and_hms(2015, 7, 24, 18, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2015, 8, 3, 18, 0, 0).unwrap(),
        ),
        roster,
        detail_path: report_dir.join("edits_byusers_editathon_aposteriori2.txt"),
        summary_path: report_dir.join("report_global_edits_aposteriori2.txt"),
    };
    let state = aposteriori2.run(&client, &policy).await?;
    info!(all_edits = state.all_edits, "second post-event window done");

    Ok(())
}
