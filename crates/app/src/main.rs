use aeda_core::{
    attachment_prompt, content_upload_record, qa_interaction_record, AuditRecord,
    ChatOrchestrator, Document, IngestionPipeline, PipelineConfig, ProviderId,
};
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "aeda", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Credential for the Gemini backend
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,

    /// Credential for the Groq backend
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    groq_api_key: Option<String>,

    /// Base URL of the local Ollama runtime
    #[arg(long, default_value = "http://127.0.0.1:11434")]
    ollama_host: String,

    /// Maximum seconds to wait for remote file processing
    #[arg(long, default_value = "120")]
    poll_timeout_secs: u64,

    /// Append-only JSONL file receiving audit records
    #[arg(long)]
    records_out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract structured content (summary, full text, keywords) from a document.
    Extract {
        /// Path to a PDF or image
        #[arg(long)]
        file: PathBuf,
        /// Backend: gemini, groq, or ollama. Defaults to gemini.
        #[arg(long)]
        provider: Option<String>,
    },
    /// Ask the tutor a question, optionally grounded in a context file or attachment.
    Ask {
        /// The question to ask
        #[arg(long)]
        question: String,
        /// Plain-text file used as document context
        #[arg(long)]
        context_file: Option<PathBuf>,
        /// Document to ingest and fold into the question
        #[arg(long)]
        attach: Option<PathBuf>,
        /// Backend: gemini, groq, or ollama. Defaults to gemini.
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig {
        google_api_key: cli.google_api_key.clone(),
        groq_api_key: cli.groq_api_key.clone(),
        ollama_host: cli.ollama_host.clone(),
        poll_timeout: Duration::from_secs(cli.poll_timeout_secs),
        ..Default::default()
    };

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "aeda boot"
    );

    match cli.command {
        Command::Extract { file, provider } => {
            let provider = parse_provider(provider.as_deref())?;
            let document = load_document(&file)?;
            let pipeline = IngestionPipeline::from_config(&config);

            let result = pipeline
                .ingest(&document, provider)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!("{}", serde_json::to_string_pretty(&result)?);

            let record = content_upload_record(&result);
            emit_record(cli.records_out.as_deref(), &record)?;
        }
        Command::Ask {
            question,
            context_file,
            attach,
            provider,
        } => {
            let provider = parse_provider(provider.as_deref())?;
            let context = match &context_file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("unable to read {}", path.display()))?,
                None => String::new(),
            };

            let prompt = match &attach {
                Some(path) => {
                    let document = load_document(path)?;
                    let pipeline = IngestionPipeline::from_config(&config);
                    match pipeline.ingest(&document, provider).await {
                        Ok(result) => attachment_prompt(
                            &document.file_name,
                            Some(&result.full_extraction),
                            &question,
                        ),
                        Err(error) => {
                            warn!(%error, file = %path.display(), "attachment processing failed");
                            attachment_prompt(&document.file_name, None, &question)
                        }
                    }
                }
                None => question.clone(),
            };

            let orchestrator = ChatOrchestrator::from_config(&config);
            let answer = match orchestrator.answer(&[], &prompt, &context, provider).await {
                Ok(answer) => answer,
                Err(error) => {
                    warn!(%error, "chat dispatch failed");
                    "I'm having trouble connecting to my brain right now. Please check my API key setup.".to_string()
                }
            };

            println!("{answer}");

            let record = qa_interaction_record(prompt, answer);
            emit_record(cli.records_out.as_deref(), &record)?;
        }
    }

    Ok(())
}

fn parse_provider(raw: Option<&str>) -> anyhow::Result<Option<ProviderId>> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse::<ProviderId>()
            .map(Some)
            .map_err(|error| anyhow::anyhow!(error.to_string())),
    }
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    let bytes =
        std::fs::read(path).with_context(|| format!("unable to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("path missing filename: {}", path.display()))?;

    Ok(Document::new(bytes, mime_for(path), file_name))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

fn emit_record(records_out: Option<&Path>, record: &AuditRecord) -> anyhow::Result<()> {
    let json = serde_json::to_string(record)?;
    println!("record: {json}");

    if let Some(path) = records_out {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("unable to open {}", path.display()))?;
        writeln!(file, "{json}")?;
        info!(path = %path.display(), "audit record appended");
    }

    Ok(())
}
