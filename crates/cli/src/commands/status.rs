//! `studyclaw status` — configuration, memory, and study-goal state.

use studyclaw_config::AppConfig;
use studyclaw_memory::ConversationStore;
use studyclaw_tools::{StatsStore, stats};

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    let store = ConversationStore::new(
        config.memory_path(),
        config.memory.threshold_bytes(),
        config.memory.keep_last_n,
    );
    let conversation = store.load();

    println!();
    println!("  studyclaw status");
    println!("  ----------------");
    println!("  Provider:      {}", config.provider);
    println!("  Model:         {}", config.model);
    println!(
        "  API key:       {}",
        if config.api_key.is_some() { "configured" } else { "missing" }
    );
    println!();
    println!("  Memory file:   {}", store.path().display());
    println!("  Messages:      {}", conversation.len());
    println!(
        "  Size:          {} / {} bytes",
        store.size_bytes(&conversation),
        config.memory.threshold_bytes()
    );
    println!();

    let stats_store = StatsStore::new(config.stats_path());
    let stats_file = stats_store.load();
    println!("  Stats file:    {}", stats_store.path().display());
    match stats_file.weekly_goal_hours {
        Some(goal) => {
            let this_week = stats_file.hours_in_week(stats::week_start(stats::today()));
            println!("  Weekly goal:   {goal:.1} hours");
            println!("  This week:     {this_week:.1} hours logged");
        }
        None => println!("  Weekly goal:   not set"),
    }
    println!(
        "  Sessions:      {} logged in total",
        stats_file.learning_sessions.len()
    );
    println!();

    Ok(())
}
