use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fusionrag_core::config::{Config, Settings};
use fusionrag_core::error::Error;
use fusionrag_core::types::TopK;
use fusionrag_embed::get_default_embedder;
use fusionrag_ingest::{collect_uploads, Ingestor};
use fusionrag_session::Session;

mod render;

#[derive(Parser, Debug)]
#[command(name = "fusionrag", version, about = "Ask questions about your PDF, DOCX and image files")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the text extracted from each file
    Extract {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Answer one query
    Ask {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(short, long)]
        query: String,
        /// Number of answers (1-10)
        #[arg(short = 'k', long, value_parser = parse_top_k)]
        top_k: Option<TopK>,
        /// Also write the answers as an HTML page
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Index once, then answer queries read from stdin
    Chat {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(short = 'k', long, value_parser = parse_top_k)]
        top_k: Option<TopK>,
    },
}

fn parse_top_k(s: &str) -> Result<TopK, String> {
    let value: usize = s.parse().map_err(|e| format!("{e}"))?;
    TopK::new(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(err @ Error::EmptyCorpus) => eprintln!("{err}"),
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::load()?;
    let settings = config.settings()?;
    match args.command {
        Commands::Extract { paths } => extract(&paths, &settings),
        Commands::Ask { paths, query, top_k, html } => {
            let session = build_session(&paths, &settings).await?;
            let top_k = top_k.unwrap_or(settings.answer.top_k);
            let answers = session.ask(&query, top_k).await?;
            let marker = session.marker();
            print!("{}", render::terminal(&answers, marker, top_k.get()));
            if let Some(out) = html {
                std::fs::write(&out, render::html_page(&query, &answers, marker, top_k.get()))?;
                tracing::info!(path = %out.display(), "wrote HTML answers");
            }
            Ok(())
        }
        Commands::Chat { paths, top_k } => {
            let session = build_session(&paths, &settings).await?;
            chat(&session, top_k.unwrap_or(settings.answer.top_k)).await
        }
    }
}

fn extract(paths: &[PathBuf], settings: &Settings) -> anyhow::Result<()> {
    let uploads = collect_uploads(paths)?;
    let documents = Ingestor::from_settings(&settings.ocr).load_files(&uploads);
    if documents.is_empty() {
        return Err(Error::EmptyCorpus.into());
    }
    for doc in &documents {
        let page = doc.page.map(|p| format!(" page {p}")).unwrap_or_default();
        println!("== {}{} ({} chars) ==", doc.source, page, doc.content.chars().count());
        println!("{}\n", doc.content.trim());
    }
    Ok(())
}

async fn build_session(paths: &[PathBuf], settings: &Settings) -> anyhow::Result<Session> {
    let uploads = collect_uploads(paths)?;
    let embedder = get_default_embedder(&settings.embedding)?;
    let session = Session::build(&uploads, settings, embedder).await?;
    eprintln!("Indexed {} documents ({} chunks)", session.documents().len(), session.chunk_count());
    Ok(session)
}

async fn chat(session: &Session, mut top_k: TopK) -> anyhow::Result<()> {
    let marker = session.marker();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("query> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" {
            break;
        }
        if let Some(value) = input.strip_prefix("/top-k") {
            match parse_top_k(value.trim()) {
                Ok(k) => { top_k = k; println!("top-k set to {}", k.get()); }
                Err(e) => println!("{e}"),
            }
            continue;
        }
        let answers = session.ask(input, top_k).await?;
        print!("{}", render::terminal(&answers, marker, top_k.get()));
    }
    Ok(())
}
