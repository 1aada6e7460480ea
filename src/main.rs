//! kbchat-view - replay tool for the chat view logic
//!
//! - `annotate`: print a conversation with headers, timestamp dividers and
//!   the load-more affordance as the timeline would render them
//! - `badges`: feed recorded engine notifications through the listener and
//!   print the actions that get dispatched

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use crossbeam_channel::{unbounded, Receiver};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use kbchat_view::badges::BadgeIngester;
use kbchat_view::config::{self, Settings};
use kbchat_view::error::Result;
use kbchat_view::logging;
use kbchat_view::message::Message;
use kbchat_view::notifications::NotificationListener;
use kbchat_view::protocol::Action;
use kbchat_view::state::ClientState;
use kbchat_view::timeline::{FirstOrdinal, LoadMoreState};
use kbchat_view::timestamp::{AnchoredTimeFormatter, LocalTimeFormatter, TimeFormatter};
use kbchat_view::wrapper::{wrapper_props, RowState};

#[derive(Parser, Debug)]
#[command(name = "kbchat-view")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON array of messages as an annotated timeline
    Annotate {
        path: PathBuf,
        /// Format timestamps relative to this RFC 3339 instant instead of now
        #[arg(long)]
        now: Option<DateTime<FixedOffset>>,
    },
    /// Replay JSON-lines notifications ({"method": .., "params": ..})
    Badges { path: PathBuf },
}

#[derive(Deserialize)]
struct RecordedNotification {
    method: String,
    params: Value,
}

fn main() {
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => config::load_settings_from(path).unwrap_or_else(|e| {
            eprintln!("Failed to load {}: {}", path.display(), e);
            std::process::exit(2);
        }),
        None => config::load_settings(),
    };
    logging::init(&settings.log_filter, args.debug);

    let result = match args.command {
        Command::Annotate { path, now } => match now {
            Some(now) => annotate(&path, &settings, &AnchoredTimeFormatter::new(now)),
            None => annotate(&path, &settings, &LocalTimeFormatter),
        },
        Command::Badges { path } => replay_badges(&path, &settings),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn annotate(path: &Path, settings: &Settings, formatter: &impl TimeFormatter) -> Result<()> {
    let messages: Vec<Message> = serde_json::from_str(&fs::read_to_string(path)?)?;
    info!("Annotating {} messages", messages.len());

    let state = ClientState::from_settings(settings);
    for (i, msg) in messages.iter().enumerate() {
        let previous = i.checked_sub(1).map(|p| &messages[p]);
        let props = wrapper_props(&state, msg, previous, RowState::default(), &FirstOrdinal, formatter);

        match props.load_more {
            LoadMoreState::MoreToLoad => println!("  [load more]"),
            LoadMoreState::NoMoreToLoad => println!("  [start of conversation]"),
            LoadMoreState::None => {}
        }
        if let Some(label) = &props.timestamp {
            println!("  ---- {} ----", label);
        }
        if props.include_header {
            let you = if props.is_you { " (you)" } else { "" };
            println!("{}{}:", props.author, you);
        }
        let mut flags = Vec::new();
        if props.is_edited {
            flags.push("edited");
        }
        if props.is_revoked {
            flags.push("revoked device");
        }
        println!("    #{} {:?} {}", msg.ordinal, msg.msg_type, flags.join(", "));
    }
    Ok(())
}

fn replay_badges(path: &Path, settings: &Settings) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(replay(&content, settings))
}

async fn replay(content: &str, settings: &Settings) -> Result<()> {
    let window = settings.badge_throttle();
    let (tx, rx) = unbounded::<Action>();
    let badges = BadgeIngester::new(tx.clone(), window)?
        .on_mobile_count(|count| info!(count, "mobile badge count"));
    let mut listener = NotificationListener::new(tx, badges);
    let mut state = ClientState::from_settings(settings);

    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let recorded: RecordedNotification = match serde_json::from_str(line) {
            Ok(recorded) => recorded,
            Err(e) => {
                warn!("Skipping line {}: {}", lineno + 1, e);
                continue;
            }
        };
        match listener.handle_rpc(&recorded.method, recorded.params) {
            Ok(handled) => info!(line = lineno + 1, ?handled, "notification handled"),
            Err(e) => warn!("Line {}: {}", lineno + 1, e),
        }
        drain(&rx, &mut state)?;
    }

    // Let any trailing throttled update fire
    tokio::time::sleep(window + Duration::from_millis(50)).await;
    drain(&rx, &mut state)?;

    println!("unread total: {}", state.unread_total());
    println!("following: {}", state.config.following.len());
    Ok(())
}

fn drain(rx: &Receiver<Action>, state: &mut ClientState) -> Result<()> {
    while let Ok(action) = rx.try_recv() {
        println!("{}", serde_json::to_string(&action)?);
        state.reduce(action);
    }
    Ok(())
}
