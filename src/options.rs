use clap::Parser;

/// Music catalog web application
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file (default: `songbook.toml` if present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Address to listen on, overrides `system.bind_addr`
    #[arg(short, long)]
    pub address: Option<String>,
}
