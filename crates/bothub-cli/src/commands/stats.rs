//! Stats command

use anyhow::Result;
use bothub_store::Database;
use colored::Colorize;

pub async fn run(db: &Database) -> Result<()> {
    let stats = db.stats().await;

    println!("{}", "BotHub stats".blue().bold());
    println!("   Users:     {}", stats.users);
    println!(
        "   Downloads: {} total, {} today",
        stats.downloads.total, stats.downloads.today
    );
    println!(
        "   By type:   rdx {}, c3c {}",
        stats.by_type.rdx, stats.by_type.c3c
    );
    println!("   Clones:    {}", stats.clones);

    Ok(())
}
