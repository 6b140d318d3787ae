use clap::Parser;
use std::path::PathBuf;

// Build version with engine info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Engine: headless timeline/playback core\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Timeline editing and playback-sync engine (headless demo driver)
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Seconds of playback to simulate before exiting
    #[arg(short = 's', long = "seconds", value_name = "SECS", default_value = "8.0")]
    pub seconds: f64,

    /// Driver tick rate in Hz
    #[arg(short = 'r', long = "rate", value_name = "HZ", default_value = "60")]
    pub tick_rate: u32,

    /// Dump the final timeline state as JSON to stdout
    #[arg(short = 'd', long = "dump")]
    pub dump: bool,

    /// Enable debug logging to file instead of the console
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
