//! npcchat — replay a player chat log through the village guard.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use npcchat_core::loader;
use npcchat_session::{report, settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the key may already be in the environment.
    dotenvy::dotenv().ok();

    let config = settings::load_config()?;
    settings::init_tracing(&config.general.log_level);

    let path = settings::messages_path(&config);
    info!(path = %path.display(), "Reading and sorting messages");
    let messages = loader::load_from_file(&path)
        .with_context(|| format!("loading messages from {}", path.display()))?;
    info!(count = messages.len(), "Messages are in chronological order");

    let client = settings::build_client(&config.llm)?;
    let mut driver = settings::build_driver(&config, Arc::new(client));

    let summary = driver
        .run(&messages, |interaction| println!("{interaction}\n"))
        .await;

    println!("{summary}");
    report::log_final_states(driver.registry());
    Ok(())
}
