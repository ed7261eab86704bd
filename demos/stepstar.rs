//! Interactive A* board in the terminal.
//!
//! Run: cargo run --bin stepstar [seed] [board-file]
//!
//! A numeric argument pins the RNG seed; any other argument names a board
//! file. An existing board file is loaded, and every new board is saved to
//! it.
//!
//! Logging is controlled with `RUST_LOG`; redirect stderr to keep it off
//! the board, e.g. `RUST_LOG=debug cargo run --bin stepstar 2>stepstar.log`.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, terminal,
};
use stepstar_demos::{Command, Flow, Host, draw};
use stepstar_rl::{BoardConfig, LayoutError};

fn to_command(ev: KeyEvent) -> Option<Command> {
    if ev.kind != KeyEventKind::Press {
        return None;
    }
    match ev.code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(c) => Command::from_char(c),
        _ => None,
    }
}

fn run(host: &mut Host) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout();
    draw(host, &mut stdout)?;
    loop {
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        let Some(cmd) = to_command(key) else {
            continue;
        };
        if host.apply(cmd)? == Flow::Quit {
            return Ok(());
        }
        draw(host, &mut stdout)?;
    }
}

fn open_host(config: BoardConfig, board: Option<PathBuf>) -> Result<Host, LayoutError> {
    match board {
        Some(path) if path.exists() => Host::load(config, path),
        Some(path) => {
            let mut host = Host::new(config)?;
            host.save_boards_to(path)?;
            Ok(host)
        }
        None => Host::new(config),
    }
}

fn main() {
    env_logger::init();

    let mut config = BoardConfig::default();
    let mut board = None;
    for arg in std::env::args().skip(1) {
        match arg.parse() {
            Ok(seed) => config.seed = Some(seed),
            Err(_) => board = Some(PathBuf::from(arg)),
        }
    }

    let mut host = match open_host(config, board) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = terminal::enable_raw_mode()
        .and_then(|()| {
            execute!(
                io::stdout(),
                terminal::EnterAlternateScreen,
                cursor::Hide
            )
        })
        .map_err(Into::into)
        .and_then(|()| run(&mut host));

    let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    match host.seed() {
        Some(seed) => log::info!("final board seed {seed}"),
        None => log::info!("final board loaded from file"),
    }
}
