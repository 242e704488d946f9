use std::sync::Arc;

use hepiq_core::{config::Config, store::TicketStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hepiq_core::logging::init("hepiq")?;

    let cfg = Arc::new(Config::load()?);
    let store = Arc::new(TicketStore::open(&cfg.database_path)?);

    if let Err(e) = hepiq_telegram::router::run_polling(cfg, store).await {
        tracing::error!("telegram bot failed: {e}");
        return Err(e);
    }

    Ok(())
}
