mod demo;

use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use frames::{Frame, decode_frame, encode_frame, events};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};
use trajectories::command::CommandError;
use trajectories::model::live_count;
use trajectories::{HeadlessScene, SessionState, SyncConfig};

type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Time given to the join handshake before the demo starts authoring, so
/// the room's state is in place and new trajectories append to it.
const DEMO_SETTLE: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("websocket error: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed by relay")]
    WsClosed,
    #[error("demo edit rejected: {0}")]
    Command(#[from] CommandError),
    #[error("summary encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for CliError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}

#[derive(Parser, Debug)]
#[command(name = "trajectories-cli", about = "Headless trajectory sync peer")]
struct Cli {
    #[arg(long, env = "TRAJ_RELAY_URL", default_value = "ws://127.0.0.1:3000/api/ws")]
    url: String,

    /// Local simulation rate.
    #[arg(long, env = "TRAJ_TICK_HZ", default_value_t = 60)]
    tick_hz: u32,

    /// Leave after this many seconds; run until the relay closes otherwise.
    #[arg(long, env = "TRAJ_DURATION_SECS")]
    duration_secs: Option<u64>,

    /// Print summaries as JSON lines.
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join and mirror the room.
    Watch,
    /// Join, then author trajectories and animating objects.
    Demo(DemoArgs),
}

#[derive(Args, Debug, Clone, Copy, PartialEq)]
struct DemoArgs {
    #[arg(long, default_value_t = 2)]
    trajectories: usize,

    #[arg(long, default_value_t = 3)]
    objects: usize,

    /// Fraction of a path travelled per second.
    #[arg(long, default_value_t = 0.2)]
    speed: f64,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let (mut stream, _) = connect_async(cli.url.as_str()).await?;
    info!(url = %cli.url, "connected to relay");

    let mut session = SessionState::new(SyncConfig::from_env(), HeadlessScene::new());
    let mut pending_demo = match cli.command {
        Command::Watch => None,
        Command::Demo(args) => Some(args),
    };
    let mut connected_at: Option<Instant> = None;

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(cli.tick_hz.max(1))));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut report = tokio::time::interval(Duration::from_secs(1));
    let deadline = cli.duration_secs.map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            message = stream.next() => {
                let Some(message) = message else {
                    session.on_transport_lost();
                    return Err(CliError::WsClosed);
                };
                let frame = match message? {
                    Message::Binary(bytes) => match decode_frame(&bytes) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(error = %e, "undecodable frame ignored");
                            continue;
                        }
                    },
                    Message::Close(_) => {
                        session.on_transport_lost();
                        return Err(CliError::WsClosed);
                    }
                    _ => continue,
                };
                let now = Instant::now();
                if frame.event == events::CONNECTED {
                    connected_at = Some(now);
                }
                let replies = session.handle_frame(&frame, now);
                send_all(&mut stream, replies).await?;
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                if let (Some(args), Some(at)) = (pending_demo, connected_at)
                    && now.duration_since(at) >= DEMO_SETTLE
                {
                    pending_demo = None;
                    demo::author(&mut session, args, now)?;
                }
                let dt = now.duration_since(last_tick).as_secs_f64();
                last_tick = now;
                let outbound = session.tick(now, dt);
                session.clear_dirty();
                send_all(&mut stream, outbound).await?;
            }
            _ = report.tick() => print_summary(&mut session, cli.json)?,
            () = wait_until(deadline) => {
                info!("duration elapsed, leaving");
                break;
            }
        }
    }

    stream.close(None).await?;
    Ok(())
}

async fn send_all(stream: &mut WsStream, frames: Vec<Frame>) -> Result<(), CliError> {
    for frame in frames {
        stream.send(Message::Binary(encode_frame(&frame).into())).await?;
    }
    Ok(())
}

async fn wait_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn print_summary(session: &mut SessionState<HeadlessScene>, as_json: bool) -> Result<(), CliError> {
    let presence_changed = session.take_presence_changed();
    let peers: Vec<String> = session
        .registry()
        .presence()
        .into_iter()
        .map(|p| format!("{}={}", p.client_id, p.color))
        .collect();
    let trajectories = session.trajectories().len();
    let objects = live_count(session.objects());
    let shadows = session.registry().shadow_count();
    let id = session.local_id().unwrap_or("-");
    let color = session.color().unwrap_or("-");

    if as_json {
        let line = json!({
            "clientId": id,
            "color": color,
            "trajectories": trajectories,
            "objects": objects,
            "shadows": shadows,
            "peers": peers,
            "presenceChanged": presence_changed,
        });
        println!("{}", serde_json::to_string(&line)?);
    } else {
        println!("{id} ({color}) trajectories={trajectories} objects={objects} shadows={shadows} peers={}", peers.len());
        if presence_changed {
            println!("  peers: {}", peers.join(", "));
        }
    }
    Ok(())
}
