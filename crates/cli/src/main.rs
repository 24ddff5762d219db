use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use solace_core::mood::{empty_history_message, relative_day, saved_confirmation};
use solace_core::safety::helplines;
use solace_core::{emergency_notice, safety_disclaimer, Intent, Language, MoodScore};
use solace_engine::{EngineConfig, MoodJournal, ResponseEngine};
use solace_observability::{init_tracing_with_default, AppMetrics};
use solace_storage::Store;

#[derive(Debug, Parser)]
#[command(name = "solace")]
#[command(about = "Solace wellness companion CLI")]
struct Cli {
    /// Reply language: en or ta.
    #[arg(long, default_value = "en")]
    language: String,

    #[arg(long, default_value = "local")]
    user: String,

    #[arg(long, env = "SOLACE_DATABASE_URL")]
    database_url: Option<String>,

    /// Pause before each chat reply, in milliseconds.
    #[arg(long, env = "SOLACE_REPLY_DELAY_MS")]
    reply_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat,
    Classify {
        text: String,
    },
    Mood {
        #[command(subcommand)]
        command: MoodCommand,
    },
    Disclaimer,
}

#[derive(Debug, Subcommand)]
enum MoodCommand {
    Log {
        score: i64,
        #[arg(long, default_value = "")]
        note: String,
    },
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    Summary,
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing_with_default("solace_cli=info,warn");
    let cli = Cli::parse();

    let language = Language::from_optional_str(Some(&cli.language));
    let metrics = AppMetrics::shared();

    match cli.command {
        Command::Chat => {
            let config = cli
                .reply_delay_ms
                .map(|millis| EngineConfig::with_reply_delay(Duration::from_millis(millis)))
                .unwrap_or_default();
            let engine = ResponseEngine::new(config, metrics.clone());
            let journal = build_journal(cli.database_url.as_deref(), metrics).await?;
            run_chat(engine, journal, &cli.user, language).await?;
        }
        Command::Classify { text } => {
            let engine = ResponseEngine::new(EngineConfig::immediate(), metrics);
            let classification = engine.classify(&text);
            let response = engine.respond_now(&text, language);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "classification": classification,
                    "response": response,
                }))?
            );
        }
        Command::Mood { command } => {
            let journal = build_journal(cli.database_url.as_deref(), metrics).await?;
            match command {
                MoodCommand::Log { score, note } => {
                    let score = MoodScore::new(score).context("invalid mood score")?;
                    log_mood(&journal, &cli.user, score, &note, language).await?;
                }
                MoodCommand::History { limit } => {
                    print_history(&journal, &cli.user, limit, language).await?;
                }
                MoodCommand::Summary => {
                    print_summary(&journal, &cli.user, language).await?;
                }
                MoodCommand::Clear => {
                    let removed = journal.clear(&cli.user).await?;
                    println!("Removed {removed} mood entries for {}.", cli.user);
                }
            }
        }
        Command::Disclaimer => print_disclaimer(language),
    }

    Ok(())
}

async fn run_chat(
    engine: ResponseEngine,
    journal: MoodJournal<Store>,
    user_id: &str,
    mut language: Language,
) -> Result<()> {
    print_disclaimer(language);
    println!("Type '/lang' to switch language, 'exit' to quit.\n");

    loop {
        let Some(message) = prompt("> ")? else {
            break;
        };

        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.eq_ignore_ascii_case("/lang") {
            language = language.toggle();
            println!("Language: {}\n", language.display_name());
            continue;
        }

        if message.is_empty() {
            continue;
        }

        let reply = engine.respond(&message, language).await;

        if reply.is_emergency {
            let notice = emergency_notice(language);
            println!("\n!! {}", notice.title);
            println!("{}", notice.description);
            for helpline in notice.helplines {
                println!("   {}: {}", helpline.label, helpline.contact);
            }
        }

        println!("\n{}\n", reply.message);

        if reply.intent == Intent::MoodTracking {
            prompt_mood(&journal, user_id, language).await?;
        }
    }

    Ok(())
}

async fn prompt_mood(journal: &MoodJournal<Store>, user_id: &str, language: Language) -> Result<()> {
    let Some(raw_score) = prompt("Mood score 0-10 (blank to skip): ")? else {
        return Ok(());
    };
    if raw_score.is_empty() {
        return Ok(());
    }

    let score = match raw_score.parse::<i64>().map_err(anyhow::Error::from).and_then(|value| {
        MoodScore::new(value).map_err(anyhow::Error::from)
    }) {
        Ok(score) => score,
        Err(err) => {
            println!("{err}\n");
            return Ok(());
        }
    };

    let note = prompt("Note (optional): ")?.unwrap_or_default();
    log_mood(journal, user_id, score, &note, language).await
}

async fn log_mood(
    journal: &MoodJournal<Store>,
    user_id: &str,
    score: MoodScore,
    note: &str,
    language: Language,
) -> Result<()> {
    let entry = journal.record(user_id, score, note).await?;
    let (title, description) = saved_confirmation(entry.score, language);
    println!("{title}\n{description}\n");
    Ok(())
}

async fn print_history(
    journal: &MoodJournal<Store>,
    user_id: &str,
    limit: usize,
    language: Language,
) -> Result<()> {
    let entries = journal.history(user_id, limit).await?;
    if entries.is_empty() {
        println!("{}", empty_history_message(language));
        return Ok(());
    }

    let now = Utc::now();
    for entry in entries {
        let when = relative_day(entry.recorded_at, now, language);
        print!(
            "{when:<12} {} {:>2}/10 {}",
            entry.score.emoji(),
            entry.score.value(),
            entry.score.label(language)
        );
        if entry.note.is_empty() {
            println!();
        } else {
            println!("  {}", entry.note);
        }
    }

    Ok(())
}

async fn print_summary(
    journal: &MoodJournal<Store>,
    user_id: &str,
    language: Language,
) -> Result<()> {
    let summary = journal.summary(user_id).await?;
    let Some(latest) = summary.latest else {
        println!("{}", empty_history_message(language));
        return Ok(());
    };

    println!(
        "Entries: {} (last {} kept)",
        summary.entries,
        journal.history_limit()
    );
    if let Some(average) = summary.average_score {
        println!("Average: {average:.1}/10");
    }
    println!(
        "Latest: {} {}/10 {} ({})",
        latest.score.emoji(),
        latest.score.value(),
        latest.score.label(language),
        relative_day(latest.recorded_at, Utc::now(), language)
    );

    Ok(())
}

fn print_disclaimer(language: Language) {
    println!("{}", safety_disclaimer(language));
    for helpline in helplines(language) {
        println!("  {}: {}", helpline.label, helpline.contact);
    }
    println!();
}

/// Returns `None` once stdin is closed.
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim().to_string()))
}

async fn build_journal(
    database_url: Option<&str>,
    metrics: Arc<AppMetrics>,
) -> Result<MoodJournal<Store>> {
    let store = match database_url {
        Some(url) => Store::sqlite(url)
            .await
            .with_context(|| format!("failed opening mood store at {url}"))?,
        None => Store::memory(),
    };

    Ok(MoodJournal::new(Arc::new(store), metrics))
}
