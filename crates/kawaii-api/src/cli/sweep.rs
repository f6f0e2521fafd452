//! `kawaii sweep`: run the retention sweep once.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use console::style;

use kawaii_core::retention::sweeper::RetentionSweeper;
use kawaii_infra::sqlite::conversation::SqliteConversationRepository;
use kawaii_infra::sqlite::pool::DatabasePool;
use kawaii_types::config::RelayConfig;

pub async fn sweep(data_dir: &Path, config: &RelayConfig, json: bool) -> Result<()> {
    let pool = DatabasePool::open_in(data_dir).await?;
    let sweeper = RetentionSweeper::new(
        SqliteConversationRepository::new(pool.clone()),
        config.retention.max_age(),
    );
    let report = sweeper.sweep_at(Utc::now()).await?;
    pool.close().await;

    if json {
        let out = serde_json::json!({
            "deleted": report.deleted,
            "cutoff": report.cutoff,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "  {} Deleted {} conversation{} created before {}",
        style("🧹").bold(),
        style(report.deleted).bold(),
        if report.deleted == 1 { "" } else { "s" },
        style(report.cutoff.format("%Y-%m-%d %H:%M UTC")).cyan()
    );
    Ok(())
}
