//! thyme interactive entry point.
//!
//! Reads lines from stdin and routes them through the terminal stack. The
//! configuration file is taken from the first argument or `THYME_CONFIG`;
//! without either the built-in defaults are used. End of input quits.

mod session;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use session::Session;
use thyme_types::config::ThymeConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("THYME_CONFIG").ok())
        .map(PathBuf::from);
    let config = match &config_path {
        Some(path) => ThymeConfig::load(path)?,
        None => ThymeConfig::default(),
    };

    let mut session = Session::build(&config)?;
    log::info!(
        "Starting thyme ({} words in store)",
        session.store.len()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "{}", session.context.prompt())?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let reply = session.context.handle_input(&line)?;
        if reply.handled {
            write!(stdout, "{}", reply.output)?;
        } else {
            if !reply.output.is_empty() {
                writeln!(stdout, "{}", reply.output)?;
            }
            write!(stdout, "{}", session.context.prompt())?;
        }
        stdout.flush()?;
    }

    writeln!(stdout)?;
    log::info!("thyme shut down");
    Ok(())
}
