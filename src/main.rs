use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

// Import from our modular crates
use lexq_cli::{Assistant, AssistantConfig, display_banner, handle_input_with_history, print_help};
use lexq_core::{SessionStore, VectorStore};
use lexq_openai::OpenAiClient;
use lexq_rag::{CorpusIndexer, CorpusRetriever, InMemoryVectorStore, PdfLoader};

const CORPUS_TITLE: &str = "Indian Penal Code";

#[derive(Parser)]
#[command(name = "lexq")]
#[command(about = "AI-powered legal assistant for the Indian Penal Code", long_about = None)]
struct Cli {
    /// Path to the corpus PDF
    #[arg(long, default_value = "THE_INDIAN_PENAL_CODE.pdf")]
    corpus: PathBuf,

    /// Directory for the persisted vector index
    #[arg(long, default_value = "ipc_db")]
    index_dir: PathBuf,

    /// Session id for conversation memory
    #[arg(long, default_value = "user1")]
    session: String,

    /// Ask a single question and exit
    #[arg(short, long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Missing credentials abort here, before any indexing work
    let client = Arc::new(OpenAiClient::from_env()?);

    // Startup pipeline: load -> split -> embed/index -> persist
    println!("{} Loading corpus from {}...", "📚".blue(), cli.corpus.display());
    let pages = PdfLoader::load(&cli.corpus)?;

    let mut vector_store = InMemoryVectorStore::new();
    vector_store.connect().await?;
    let vector_store = Arc::new(vector_store);

    println!("{} Embedding {} pages...", "🧮".blue(), pages.len());
    let indexer = CorpusIndexer::new(vector_store.clone(), client.clone());
    let summary = indexer.index_pages(CORPUS_TITLE, &pages).await?;
    vector_store.persist_to(&cli.index_dir).await?;
    println!(
        "{} Indexed {} chunks from {} pages",
        "✅".green(),
        summary.chunks_indexed,
        summary.pages
    );

    let retriever = CorpusRetriever::new(vector_store.clone(), client.clone());
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(3600)));
    let assistant = Assistant::new(
        client.clone(),
        retriever,
        sessions.clone(),
        AssistantConfig::default(),
    );

    // Handle one-shot question
    if let Some(question) = cli.question {
        let answer = assistant.answer(&cli.session, &question).await?;
        println!("{}", answer);
        return Ok(());
    }

    // Interactive mode
    display_banner();

    let mut history = Vec::new();

    loop {
        let input = handle_input_with_history(&mut history).await?;

        if input.is_empty() {
            continue;
        }

        let input_lower = input.to_lowercase();

        if input_lower == "exit" || input_lower == "quit" {
            println!("{}", "👋 Goodbye!".green());
            break;
        }

        if input_lower == "help" {
            print_help();
            continue;
        }

        println!("{} Thinking...", "🤖".blue());

        match assistant.answer(&cli.session, &input).await {
            Ok(answer) => {
                println!();
                println!("{}", answer);
                println!();
            }
            Err(e) if e.is_transient() => {
                println!(
                    "{} Service unavailable, please try again: {}",
                    "⚠️".yellow(),
                    e
                );
            }
            Err(e) => {
                println!("{} Failed to answer: {}", "❌".red(), e);
            }
        }

        sessions.evict_stale()?;
    }

    Ok(())
}
