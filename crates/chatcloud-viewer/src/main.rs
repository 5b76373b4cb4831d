mod command;
mod net;
mod render;
mod state;
mod util;

use anyhow::Result;
use chatcloud_core::Msg;
use command::{parse_command, Command, HELP};
use crossbeam_channel::{Receiver, RecvError};
use net::Incoming;
use state::{Update, ViewerState};
use std::io::BufRead;
use tracing_subscriber::EnvFilter;
use util::config::{load_or_init, ViewerConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

enum Input {
    Net(Result<Incoming, RecvError>),
    Line(Result<String, RecvError>),
}

fn spawn_stdin() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn main() -> Result<()> {
    init_tracing();
    let config = load_or_init();
    tracing::info!(sock = %config.sock_path, viewport = ?config.viewport(), "connecting");

    let (tx, net_rx) = crossbeam_channel::unbounded();
    let agent = net::spawn_reader(config.sock_path.clone(), config.viewport(), tx);
    let lines = spawn_stdin();
    let mut state = ViewerState::default();

    println!("{HELP}");
    loop {
        let input = crossbeam_channel::select! {
            recv(net_rx) -> incoming => Input::Net(incoming),
            recv(lines) -> line => Input::Line(line),
        };
        match input {
            Input::Net(Ok(incoming)) => match state.apply(incoming) {
                Update::Status => println!("{}", render::render_status(&state)),
                Update::Timeline => println!(
                    "{}",
                    render::render_timeline(&state, config.timeline_inner_width(), config.bar_width)
                ),
                Update::Cloud => println!("{}", render::render_cloud(&state, config.top_words)),
                Update::Progress | Update::Nothing => {}
            },
            Input::Net(Err(_)) => {
                tracing::info!("agent connection closed");
                break;
            }
            // stdin closed
            Input::Line(Err(_)) => break,
            Input::Line(Ok(line)) => match parse_command(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => break,
                Ok(Some(Command::Show)) => show(&state, &config),
                Ok(Some(Command::Brush { x0, x1 })) => send(&agent, Msg::Brush { x0, x1 }),
                Ok(Some(Command::Clear)) => send(&agent, Msg::ClearBrush),
                Err(err) => println!("{err:#}"),
            },
        }
    }
    Ok(())
}

fn send(agent: &net::ReaderHandle, msg: Msg) {
    if !agent.send(msg) {
        println!("not connected to the agent");
    }
}

fn show(state: &ViewerState, config: &ViewerConfig) {
    println!("{}", render::render_status(state));
    println!(
        "{}",
        render::render_timeline(state, config.timeline_inner_width(), config.bar_width)
    );
    println!("{}", render::render_cloud(state, config.top_words));
}
