// Example: Basic usage of the chirp-core library
use chirp_core::compose::{clean_message, ReplyComposer};
use chirp_core::lifecycle::FavoriteLifecycle;
use chirp_core::models::Classification;
use chirp_core::storage::{Database, SqliteFavoriteStore};
use chrono::{Duration, SubsecRound, Utc};

fn main() -> anyhow::Result<()> {
    println!("--- Basic Usage of chirp-core ---");

    // ========== Reply Composition ==========
    println!("\n1. Composing replies...");
    let classifier = |text: &str| -> chirp_core::Result<Vec<Classification>> {
        if text.starts_with("hi") {
            Ok(vec![Classification::new("greeting", 0.9)])
        } else {
            Ok(vec![Classification::new("thank_follow", 0.8)])
        }
    };
    let follow_check = |handle: &str| -> chirp_core::Result<bool> { Ok(handle == "alice") };
    let mut composer = ReplyComposer::from_entropy(follow_check);

    let raw = "@chirp hi there https://example.com";
    println!("   Cleaned {:?} -> {:?}", raw, clean_message(raw));
    let reply = composer.respond(&classifier, raw, "alice")?;
    println!("   ✓ {}", reply.text);
    let reply = composer.respond(&classifier, "thanks for the #follow", "bob")?;
    println!("   ✓ {}", reply.text);
    println!("   ✓ Intro: {}", composer.intro());

    // ========== Favorite Lifecycle ==========
    println!("\n2. Tracking favorites...");
    let conn = Database::open_in_memory()?;
    let mut lifecycle = FavoriteLifecycle::new(SqliteFavoriteStore::new(conn));

    let t0 = Utc::now().trunc_subsecs(0) - Duration::hours(30);
    let first = lifecycle.try_favorite_at("item-42", 7, "alice", "from feed", t0)?;
    let second = lifecycle.try_favorite_at("item-42", 7, "alice", "from feed", t0)?;
    println!("   ✓ First attempt created: {}", first.created());
    println!("   ✓ Second attempt created: {}", second.created());

    // ========== Unfavorite Sweep ==========
    println!("\n3. Sweeping favorites older than 24h...");
    let now = Utc::now().trunc_subsecs(0);
    let report = lifecycle.sweep(now - Duration::hours(24), 10, now)?;
    for record in &report.unfavorited {
        println!("   ✓ Unfavorited {} at {}", record.item_id, now);
    }

    let history = lifecycle.history("item-42")?;
    println!("   ✓ {} record(s) kept for item-42", history.len());

    Ok(())
}
