use clap::Parser;
use simplelog::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "Browse and edit a remote record collection", long_about = None)]
#[command(version)]
pub struct Args {
    /// Base URL of the collection service
    #[arg(long, env = "ROSTER_URL", required_unless_present = "memory")]
    pub url: Option<String>,

    /// Collection path segment
    #[arg(long, default_value = "client")]
    pub collection: String,

    /// Use a seeded in-memory collection instead of a backend
    #[arg(long)]
    pub memory: bool,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"], default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn level(&self) -> LevelFilter {
        match self.log_level.as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        }
    }
}
