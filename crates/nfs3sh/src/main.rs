//! Interactive NFSv3/MOUNT3 shell entry point: parses CLI flags, sets up
//! logging, and drives the read-eval-print loop.

mod commands;
mod config;
mod errors;
mod path;
mod session;

use std::io::Write as _;

use config::Config;
use errors::ShellError;
use session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .with_writer(std::io::stderr)
        .init();

    let mut session = Session::new();

    // The REPL rearms a fresh token before every command; the handler below
    // always cancels whichever one is current, so a SIGINT aborts only the
    // call in flight rather than poisoning the rest of the session.
    let cancel = session.cancel_cell();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            cancel.cancel();
            eprintln!();
        })?;
    }

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        cancel.rearm();

        if config.interactive {
            print!("nfs3sh> ");
            std::io::stdout().flush()?;
        }

        line.clear();
        let bytes_read = stdin.read_line(&mut line)?;
        if bytes_read == 0 {
            break;
        }

        let words = commands::tokenize(&line);
        if words.is_empty() {
            continue;
        }

        match commands::dispatch(&mut session, &words).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(ShellError::Client(nfs3_client::error::Error::Cancelled)) => {
                println!("interrupted");
            }
            Err(e) => println!("{e}"),
        }
    }

    Ok(())
}
