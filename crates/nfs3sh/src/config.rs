//! CLI flags, translated from the original `nfsshell -v -i` switches.

use clap::Parser;

/// An interactive NFSv3/MOUNT3 client.
#[derive(Parser, Debug)]
#[command(name = "nfs3sh", version, about, long_about = None)]
struct Args {
    /// Disable verbose RPC/error logging.
    #[arg(short = 'v')]
    quiet: bool,

    /// Disable the interactive prompt (for scripted input).
    #[arg(short = 'i')]
    noninteractive: bool,
}

/// Resolved shell configuration: verbose and interactive both default on,
/// each switched off by its matching flag.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub verbose: bool,
    pub interactive: bool,
}

impl Config {
    pub fn from_args() -> Self {
        let args = Args::parse();
        Self {
            verbose: !args.quiet,
            interactive: !args.noninteractive,
        }
    }

    pub fn tracing_level(self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}
