//! Download and clone counters

use anyhow::Result;
use bothub_store::Database;
use colored::Colorize;

pub async fn download(
    db: &Database,
    user_id: Option<&str>,
    download_type: Option<&str>,
) -> Result<()> {
    db.record_download(user_id, download_type).await;
    let stats = db.download_stats().await;
    println!(
        "{} Download recorded ({} total, {} today)",
        "✓".green(),
        stats.total,
        stats.today
    );
    Ok(())
}

pub async fn clone(db: &Database) -> Result<()> {
    db.record_clone().await;
    println!(
        "{} Clone recorded ({} total)",
        "✓".green(),
        db.clone_count().await
    );
    Ok(())
}
