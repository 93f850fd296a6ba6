use std::path::{Path, PathBuf};

use clap::Parser;
use pulse_chat_lib::commands::{chat, session, settings, upload};
use pulse_chat_lib::config::GatewayConfig;
use pulse_chat_lib::db::Database;
use pulse_chat_lib::render::{format_file, format_message};
use pulse_chat_lib::session::models::Message;
use pulse_chat_lib::AppState;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "pulse-chat", about = "Chat with the Pulse gateway about an Excel file")]
struct Args {
    /// Gateway base URL (overrides the stored setting)
    #[arg(long, env = "PULSE_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Directory for the local settings and upload cache
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Skip the gateway cleanup normally issued at startup
    #[arg(long)]
    skip_cleanup: bool,
}

const HELP: &str = "\
Commands:
  /upload <path>       upload an .xlsx or .xls file
  /remove              delete the active file and its data
  /file                show the active file
  /settings            list stored settings
  /set <key> <value>   store a setting (applies on next start)
  /unset <key>         remove a stored setting
  /help                show this help
  /quit                exit
Anything else is sent as a chat message.";

fn data_dir(args: &Args) -> PathBuf {
    args.data_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pulse-chat")
    })
}

/// Tracks how much of the transcript is already on screen.
#[derive(Default)]
struct Printed {
    count: usize,
    first: Option<Message>,
}

/// Prints messages added since the last call. A reset transcript is reprinted.
fn flush_transcript(state: &AppState, printed: &mut Printed) {
    let messages = state.session.messages();
    if messages.len() < printed.count || messages.first() != printed.first.as_ref() {
        printed.count = 0;
    }
    for message in &messages[printed.count..] {
        println!("{}", format_message(message));
    }
    printed.count = messages.len();
    printed.first = messages.first().cloned();
}

async fn handle_line(state: &mut AppState, line: &str) -> bool {
    let Some(command) = line.trim().strip_prefix('/') else {
        chat::send_message(state, line).await;
        return true;
    };
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command, ""));

    match name {
        "quit" | "exit" => return false,
        "help" => println!("{}", HELP),
        "upload" if rest.is_empty() => println!("Usage: /upload <path>"),
        "upload" => {
            upload::upload_file(state, Path::new(rest)).await;
        }
        "remove" => {
            upload::remove_file(state).await;
        }
        "file" => match state.session.active_file() {
            Some(file) if state.session.can_chat() => {
                println!("{} - ready for questions", format_file(file))
            }
            Some(file) => println!("{} - not ready for chat", format_file(file)),
            None if state.session.can_upload() => {
                println!("No active file. Use /upload <path> to add one.")
            }
            None => println!("No active file. An upload is in progress."),
        },
        "settings" => match settings::get_settings(&state.db) {
            Ok(map) if map.is_empty() => println!("No stored settings."),
            Ok(map) => {
                for (key, value) in map {
                    println!("{} = {}", key, value);
                }
            }
            Err(e) => eprintln!("{}", e),
        },
        "set" => match rest.split_once(char::is_whitespace) {
            Some((key, value)) => match settings::set_setting(&state.db, key, value) {
                Ok(()) => println!("Saved {}.", key),
                Err(e) => eprintln!("{}", e),
            },
            None => println!("Usage: /set <key> <value>"),
        },
        "unset" => match settings::delete_setting(&state.db, rest) {
            Ok(()) => println!("Removed {}.", rest),
            Err(e) => eprintln!("{}", e),
        },
        other => println!("Unknown command /{}. Try /help.", other),
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::try_from_env("PULSE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let args = Args::parse();
    let db = Database::open(&data_dir(&args))?;
    let mut config = GatewayConfig::from_settings(&db);
    if let Some(url) = args.gateway_url.clone() {
        config.base_url = url;
    }

    let mut state = AppState::new(db, config);
    tracing::info!(
        session = %state.id,
        gateway = %state.gateway.config().base_url,
        "starting pulse-chat"
    );
    if !args.skip_cleanup {
        session::cleanup_on_load(&mut state).await;
    }

    let mut printed = Printed::default();
    flush_transcript(&state, &mut printed);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if !handle_line(&mut state, &line).await {
            break;
        }
        flush_transcript(&state, &mut printed);
    }
    Ok(())
}
