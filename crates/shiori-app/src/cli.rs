use clap::Parser;

/// Shiori — a minimal multi-window browser shell.
#[derive(Parser, Debug)]
#[command(name = "shiori", version, about)]
pub struct Args {
    /// Open this url (or search query) right after startup.
    #[arg(short = 'o', long)]
    pub open: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Run the orchestrator without a window system.
    #[arg(long)]
    pub headless: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
