use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use feed_integration::MemoryFeed;
use shared::protocol::FeedRecord;
use sync_core::{load_overrides, load_panel_spec, MemoryPanel, SyncDriver, SyncEngine};
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Replays recorded feed events against a control panel and prints the
/// resulting control state as JSON.
#[derive(Parser, Debug)]
#[command(name = "dialsync")]
struct Cli {
    /// TOML panel description.
    #[arg(long)]
    panel: PathBuf,
    /// TOML file with path/channel overrides.
    #[arg(long)]
    params: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Mode::Composite)]
    mode: Mode,
    /// JSON-lines event log (`{"path": ..., "value": ...}`); stdin when omitted.
    #[arg(long)]
    events: Option<PathBuf>,
    /// Pause between replayed events.
    #[arg(long, default_value_t = 0)]
    interval_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Shared prev/next/value channels with navigation.
    Composite,
    /// One value path per control, no navigation.
    Individual,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let spec = load_panel_spec(&cli.panel).context("failed to load panel description")?;
    let overrides =
        load_overrides(cli.params.as_deref()).context("failed to load sync parameters")?;

    let panel = MemoryPanel::from_spec(&spec);
    let engine = match cli.mode {
        Mode::Composite => SyncEngine::init_composite(&panel.control_panel(), overrides),
        Mode::Individual => SyncEngine::init_with_controls(panel.handles(), overrides),
    };

    let feed = MemoryFeed::new();
    let driver = SyncDriver::spawn(engine, &feed)
        .await
        .context("failed to attach to feed")?;

    let interval = Duration::from_millis(cli.interval_ms);
    let replayed = match &cli.events {
        Some(path) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("failed to open event log '{}'", path.display()))?;
            replay(BufReader::new(file), &feed, interval).await?
        }
        None => replay(BufReader::new(tokio::io::stdin()), &feed, interval).await?,
    };

    feed.close();
    driver.join().await.context("sync loop failed")?;
    info!(replayed, "replay finished");

    println!("{}", serde_json::to_string_pretty(&panel.report())?);
    Ok(())
}

/// Publishes every well-formed record to the feed. Blank lines and lines
/// starting with `#` are skipped; malformed lines are logged and skipped.
async fn replay<R>(reader: R, feed: &MemoryFeed, interval: Duration) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_number = 0usize;
    let mut published = 0usize;

    while let Some(line) = lines.next_line().await.context("failed to read event log")? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record: FeedRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(error) => {
                warn!(line = line_number, %error, "skipping malformed event");
                continue;
            }
        };
        feed.publish(&record.path, record.value);
        published += 1;

        if interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(interval).await;
        }
    }

    Ok(published)
}
