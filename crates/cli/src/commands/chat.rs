//! `studyclaw chat` — interactive or single-message chat mode.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use studyclaw_agent::AgentLoop;
use studyclaw_config::{AppConfig, Prompts};
use studyclaw_core::message::Conversation;
use studyclaw_memory::ConversationStore;
use studyclaw_providers::Gateway;
use tokio::io::AsyncBufReadExt;

pub async fn run(message: Option<String>) -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // Check for an API key early — give a clear error
    if config.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export MISTRAL_API_KEY='...'     (recommended)");
        eprintln!("    export STUDYCLAW_API_KEY='...'   (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        bail!("No API key found. See above for setup instructions.");
    }

    let prompts = Prompts::load(&config.prompts_path());

    let provider = studyclaw_providers::build_from_config(&config)?;
    let gateway = Gateway::new(
        provider,
        &config.model,
        Duration::from_millis(config.agent.min_request_interval_ms),
    )
    .with_temperature(config.temperature)
    .with_max_tokens(config.max_tokens);

    let tools = Arc::new(studyclaw_tools::default_registry(&config.stats_path())?);
    let tool_names = {
        let mut names: Vec<String> = tools.names().iter().map(|n| n.to_string()).collect();
        names.sort();
        names.join(", ")
    };

    let store = ConversationStore::new(
        config.memory_path(),
        config.memory.threshold_bytes(),
        config.memory.keep_last_n,
    );

    let agent = AgentLoop::new(
        gateway,
        tools,
        store.clone(),
        prompts,
        config.agent.max_tool_rounds,
    );

    let mut conversation = store.load();

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let response = agent.process(&mut conversation, &msg).await?;
        eprint!("\r              \r");
        println!("{response}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        studyclaw — your study coach           ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.provider);
    println!("  Model:     {}", config.model);
    println!("  Tools:     {tool_names}");
    if !conversation.is_empty() {
        println!(
            "  Memory:    {} messages from previous sessions",
            conversation.len()
        );
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type /help for commands, /exit or Ctrl+C to quit.");
    println!();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                // Save before exit; best-effort.
                store.save(&conversation);
                println!();
                println!("  Interrupted. Conversation saved. Goodbye!");
                return Ok(());
            }
        };

        let Some(line) = line else {
            // EOF (piped input ran out, or Ctrl+D)
            store.save(&conversation);
            println!();
            println!("  Conversation saved. Goodbye!");
            return Ok(());
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = input.strip_prefix('/') {
            match command.to_lowercase().as_str() {
                "exit" | "quit" => {
                    store.save(&conversation);
                    println!();
                    println!("  Conversation saved. Goodbye!");
                    return Ok(());
                }
                "help" => {
                    print_help();
                    continue;
                }
                "clear" => {
                    conversation = Conversation::new();
                    store.save(&conversation);
                    println!("  [Conversation history cleared]");
                    println!();
                    continue;
                }
                _ => {
                    println!("  Unknown command: {input}");
                    println!("  Type /help for available commands.");
                    println!();
                    continue;
                }
            }
        }

        eprint!("  ...");
        match agent.process(&mut conversation, input).await {
            Ok(response) => {
                eprint!("\r     \r");
                println!();
                for line in response.lines() {
                    println!("  Coach > {line}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }
}

fn print_help() {
    println!();
    println!("  Available commands:");
    println!("    /help    - Show this help message");
    println!("    /clear   - Clear conversation history");
    println!("    /exit    - Save and exit");
    println!("    /quit    - Save and exit");
    println!();
    println!("  Just type your message to chat with the coach!");
    println!();
}
