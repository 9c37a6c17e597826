use clap::Parser;
use songbook::{
    api::{serve, AppState},
    auth::{credentials::Credentials, session::SessionKeys},
    config::Config,
    db::DB,
    options,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "songbook=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = options::Args::parse();
    debug!("{args:?}");

    let mut config = Config::new(args.config)?;
    if let Some(address) = args.address {
        config.system.bind_addr = address;
    }

    let credentials = Credentials::new(config.auth.bcrypt_cost);
    let db = DB::open(&config.system.data_path, credentials).await?;
    db.bootstrap_admin(&config.bootstrap).await?;

    let sessions = SessionKeys::new(config.session_secret().as_bytes(), config.session_ttl()?);
    serve(AppState::new(db, sessions), &config.system.bind_addr).await?;
    Ok(())
}
