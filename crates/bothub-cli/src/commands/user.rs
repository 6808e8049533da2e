//! User commands

use anyhow::{Context, Result};
use bothub_store::Database;
use chrono::{DateTime, Duration, Utc};
use colored::Colorize;

pub async fn add(db: &Database, username: &str, email: &str, password: &str) -> Result<()> {
    let user = db
        .create_user(username, email, password)
        .await
        .with_context(|| format!("Cannot register {} <{}>", username, email))?;

    println!("{} Created user {}", "✓".green(), user.username.bold());
    println!("   id:    {}", user.id);
    println!("   email: {}", user.email);
    Ok(())
}

pub async fn find(db: &Database, identifier: &str) -> Result<()> {
    let Some(user) = db.find_user_by_login(identifier).await else {
        println!("{} No user matches {}", "✗".red(), identifier);
        return Ok(());
    };

    println!("{}", user.username.bold());
    println!("   id:       {}", user.id);
    println!("   email:    {}", user.email);
    println!("   verified: {}", user.is_verified);
    println!("   created:  {}", user.created_at.to_rfc3339());
    if let Some(expires) = user.verification_expires {
        println!("   code expires: {}", expires.to_rfc3339());
    }
    Ok(())
}

/// `now` plus `ttl_minutes`, or an error when that leaves chrono's range
fn code_expiry(now: DateTime<Utc>, ttl_minutes: i64) -> Result<DateTime<Utc>> {
    Duration::try_minutes(ttl_minutes)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .with_context(|| format!("TTL of {} minutes is out of range", ttl_minutes))
}

pub async fn set_code(db: &Database, user_id: &str, code: &str, ttl_minutes: i64) -> Result<()> {
    let expires = code_expiry(Utc::now(), ttl_minutes)?;
    match db.set_verification_code(user_id, code, expires).await {
        Some(user) => println!(
            "{} Code set for {} (expires {})",
            "✓".green(),
            user.username,
            expires.to_rfc3339()
        ),
        None => println!("{} No user with id {}", "✗".red(), user_id),
    }
    Ok(())
}

pub async fn verify(db: &Database, user_id: &str, code: &str) -> Result<()> {
    if db.verify_code(user_id, code).await {
        println!("{} Code matches", "✓".green());
    } else {
        println!("{} Code does not match", "✗".red());
    }
    Ok(())
}
