//! Poker planning terminal client.
//!
//! # Usage
//!
//! ```bash
//! # Create a room on a local relay
//! poker --host localhost:8080 --insecure --room-name "Sprint 42" --username alice
//!
//! # Join a room from a shared link
//! poker --username bob --link "http://localhost:3000/poker-planning/localhost:8080/<room>/Sprint%2042"
//! ```

use std::io::{self, BufRead};

use clap::Parser;
use poker_app::{App, AppConfig, DEFAULT_ORIGIN, Runtime, UserInput};
use poker_cli::{Command, Overlay, TextDriver};
use poker_client::{
    ChannelConfig, Deck, RoomLink, Scheme, SessionStore, websocket::{self, WebSocketConnector},
};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Poker planning client
#[derive(Parser, Debug)]
#[command(name = "poker")]
#[command(about = "Estimate stories together from the terminal")]
#[command(version)]
struct Args {
    /// Relay host (and port) rooms live on
    #[arg(long, default_value = "")]
    host: String,

    /// Human-readable room name
    #[arg(long, default_value = "")]
    room_name: String,

    /// Your name in the room
    #[arg(short, long, default_value = "")]
    username: String,

    /// Room id to open on `--host`
    #[arg(long, conflicts_with = "link")]
    room: Option<String>,

    /// Shared room link to open
    #[arg(long)]
    link: Option<String>,

    /// Card deck
    #[arg(long, default_value_t = Deck::Fibonacci)]
    deck: Deck,

    /// Connect with plain `ws` instead of `wss`
    #[arg(long)]
    insecure: bool,

    /// Origin shareable links are rooted at
    #[arg(long, default_value = DEFAULT_ORIGIN)]
    origin: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    // Stdout belongs to the session view.
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    websocket::install_crypto_provider();

    let store = SessionStore::default();
    store.set_host_name(args.host.as_str());
    store.set_room_name(args.room_name.as_str());
    store.set_username(args.username.as_str());
    store.set_deck(args.deck);

    let config = AppConfig {
        scheme: if args.insecure { Scheme::Ws } else { Scheme::Wss },
        origin: args.origin,
    };

    let (inputs, inputs_rx) = mpsc::channel(32);
    let (overlays, overlays_rx) = mpsc::unbounded_channel();

    let start = match (args.link, args.room) {
        (Some(link), _) => Some(RoomLink::parse(&link)?),
        (None, Some(_)) if args.host.trim().is_empty() => return Err("--room needs --host".into()),
        (None, Some(room_id)) => Some(RoomLink {
            host_name: args.host,
            room_id,
            room_name: args.room_name,
        }),
        (None, None) => None,
    };
    if let Some(link) = start {
        inputs.send(UserInput::OpenLink(link)).await?;
    }

    let app = App::new(store, config);
    let driver = TextDriver::new(io::stdout(), overlays_rx);
    let runtime = Runtime::new(app, driver, WebSocketConnector, ChannelConfig::default());

    // Blocking reads on a plain thread, so shutdown never waits for stdin.
    std::thread::spawn(move || {
        if let Err(error) = read_commands(&inputs, &overlays) {
            tracing::error!(%error, "reading stdin failed");
        }
    });

    runtime.run(inputs_rx).await?;
    Ok(())
}

/// Forward stdin lines to the runtime until stdin ends or the runtime stops.
fn read_commands(
    inputs: &mpsc::Sender<UserInput>,
    overlays: &mpsc::UnboundedSender<Overlay>,
) -> io::Result<()> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        let input = match poker_cli::parse(&line) {
            Ok(Command::Input(input)) => input,
            Ok(Command::Show(overlay)) => {
                let _ = overlays.send(overlay);
                UserInput::Redraw
            },
            Err(poker_cli::CommandError::Empty) => continue,
            Err(error) => {
                let _ = overlays.send(Overlay::Notice(error.to_string()));
                UserInput::Redraw
            },
        };
        if inputs.blocking_send(input).is_err() {
            break;
        }
    }
    Ok(())
}
