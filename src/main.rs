use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use motivation_board::clock::SystemClock;
use motivation_board::config::AppConfig;
use motivation_board::events::EventBus;
use motivation_board::logging::{init_logging, OperationTimer};
use motivation_board::metrics::MetricsCollector;
use motivation_board::models::Sentiment;
use motivation_board::storage::{KeyValueStore, MemoryStore, SledStore};
use motivation_board::validation::parse_templates;
use motivation_board::MotivationService;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Explicit configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known words and their templates
    Words,
    /// Add a custom word
    Add {
        /// The word
        word: String,

        /// Templates separated by commas or newlines
        #[arg(short, long)]
        templates: String,
    },
    /// Replace the templates of an existing word
    Edit {
        /// The word
        word: String,

        /// Templates separated by commas or newlines
        #[arg(short, long)]
        templates: String,
    },
    /// Remove a word (exact match)
    Remove {
        /// The word
        word: String,
    },
    /// Generate a sentence for a word, or a random word
    Generate {
        /// The word; a random known word when omitted
        word: Option<String>,

        /// Contributor name for this sentence
        #[arg(short = 'n', long)]
        contributor: Option<String>,

        /// Fixed seed for template choice
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the newest sentences
    History {
        /// Number of rows
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show history statistics
    Stats {
        /// Count duplicate sentences separately
        #[arg(long)]
        raw: bool,
    },
    /// Show sentences ranked by sentiment, then the contributor ranking
    Leaderboard {
        /// Number of rows
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show used templates per word
    Usage,
    /// Forget template usage for one word or all words
    ResetTemplates {
        /// The word; all words when omitted
        word: Option<String>,
    },
    /// Show or set the contributor name
    Contributor {
        /// New display name
        name: Option<String>,
    },
    /// Delete sentence history, or everything with --all
    Clear {
        /// Also delete words, usage and contributor data
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_from(cli.config.as_deref())?;

    // Initialize logging; the guard flushes the file writer on exit
    let log_file = config.logging.file_path.as_deref().map(Path::new);
    let _guard = init_logging(Some(&config.get_log_level()), log_file, config.logging.format == "json")?;

    if let Err(e) = MetricsCollector::init() {
        warn!(error = %e, "Metrics recorder already installed");
    }

    info!(backend = %config.storage.backend, "Starting motivation-board");

    let store = open_store(&config)?;
    let events = EventBus::new(config.event_capacity());

    // Log every notification the command produces
    let mut receiver = events.subscribe();
    let listener = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => debug!(event = event.name(), "Board event"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event listener lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut service = MotivationService::new(store, events, Arc::new(SystemClock::new()))?
        .with_validator(config.validator())
        .with_fallback_contributor(&config.board.default_contributor);

    if config.board.seed_defaults && service.seed_defaults()? {
        info!("Seeded default words");
    }

    let history_limit = usize::try_from(config.board.history_limit).unwrap_or(20);
    run(&mut service, cli.command, history_limit)?;

    drop(service);
    if let Err(e) = listener.await {
        warn!(error = %e, "Event listener stopped abnormally");
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.storage.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        _ => {
            let path = config.storage_path();
            let store = SledStore::open(&path)
                .with_context(|| format!("Failed to open store at {}", path.display()))?;
            Ok(Arc::new(store))
        },
    }
}

fn run(service: &mut MotivationService, command: Commands, history_limit: usize) -> Result<()> {
    match command {
        Commands::Words => list_words(service),
        Commands::Add { word, templates } => {
            let entry = service.add_word(&word, parse_templates(&templates))?;
            println!("เพิ่มคำ \"{}\" ({} แม่แบบ)", entry.word, entry.templates.len());
        },
        Commands::Edit { word, templates } => {
            let entry = service.edit_word(&word, parse_templates(&templates))?;
            println!("แก้ไขคำ \"{}\" ({} แม่แบบ)", entry.word, entry.templates.len());
        },
        Commands::Remove { word } => {
            if service.remove_word(&word)? {
                println!("ลบคำ \"{word}\" แล้ว");
            } else {
                println!("ไม่พบคำ \"{word}\"");
            }
        },
        Commands::Generate { word, contributor, seed } => {
            if let Some(seed) = seed {
                service.reseed(seed);
            }
            let generated = match word {
                Some(word) => service.select_word(&word, contributor.as_deref())?,
                None => service.select_random(contributor.as_deref())?,
            };
            let sentiment = generated.record.sentiment_or_default();
            println!("{}", generated.record.sentence);
            println!(
                "[{}] คำ: {} | ผู้ร่วม: {} ({} คำ)",
                sentiment.label(),
                generated.record.word,
                generated.record.contributor_or_default(),
                generated.contributor_total
            );
            if generated.recycled {
                println!("ใช้แม่แบบครบแล้ว เริ่มรอบใหม่");
            }
        },
        Commands::History { limit } => {
            for record in service.history(limit.unwrap_or(history_limit)) {
                let when = record
                    .timestamp
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{when} [{}] {} ({})",
                    record.sentiment_or_default().polarity_label(),
                    record.sentence,
                    record.contributor_or_default()
                );
            }
        },
        Commands::Stats { raw } => {
            let stats = service.statistics(!raw);
            println!("ทั้งหมด: {}", stats.total);
            println!("ผู้ร่วมสร้าง: {}", stats.unique_contributors);
            for sentiment in Sentiment::ALL {
                println!(
                    "{}: {} ({:.1}%)",
                    sentiment.label(),
                    stats.count_for(sentiment),
                    stats.percentage(sentiment)
                );
            }
            if let Some(longest) = stats.longest_record {
                println!("ยาวที่สุด: {}", longest.sentence);
            }
        },
        Commands::Leaderboard { limit } => {
            let limit = limit.unwrap_or(history_limit);
            for (rank, ranked) in service.ranked().into_iter().take(limit).enumerate() {
                println!(
                    "{}. [{} {}] {}",
                    rank + 1,
                    ranked.polarity.polarity_label(),
                    ranked.ranking_score,
                    ranked.record.sentence
                );
            }
            println!();
            for row in service.leaderboard().into_iter().take(limit) {
                println!("{}: {}", row.name, row.count);
            }
        },
        Commands::Usage => {
            for (word, used) in service.template_usage() {
                println!("{word}: {}", used.len());
                for template in used {
                    println!("  - {template}");
                }
            }
        },
        Commands::ResetTemplates { word } => {
            service.reset_templates(word.as_deref())?;
            println!("รีเซ็ตแม่แบบแล้ว");
        },
        Commands::Contributor { name } => {
            if let Some(name) = name {
                service.set_contributor_name(&name)?;
            }
            println!("{}", service.contributors().current_name());
        },
        Commands::Clear { all } => {
            if all {
                service.clear_all()?;
            } else {
                service.clear_sentences()?;
            }
            println!("ล้างข้อมูลแล้ว");
        },
    }

    Ok(())
}

fn list_words(service: &MotivationService) {
    let timer = OperationTimer::new("list_words");
    let entries = service.words().get_all();
    if entries.is_empty() {
        for word in service.words().words_or_defaults() {
            println!("{word}");
        }
    }
    for entry in entries {
        let label = entry.sentiment.unwrap_or_default().label();
        let origin = if entry.is_custom { " *" } else { "" };
        println!("{}{origin} [{label}]", entry.word);
        for template in &entry.templates {
            println!("  - {template}");
        }
    }
    timer.finish();
}
