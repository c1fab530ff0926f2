use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use docverify::{
    api::FileDocumentProvider,
    cli::{self, Cli, Commands},
    config::Config,
    models::Document,
    tui::run_tui,
    verification::{apply_filters, suggest},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "docverify=info");
    }

    let mut config = Config::from_env()?;
    init_logging(&config, matches!(args.command, Commands::Tui { .. }));

    match args.command {
        Commands::List {
            file,
            doc_type,
            date,
            declaration,
            policy,
        } => {
            if let Some(policy) = Commands::parse_policy(policy.as_deref())? {
                config.action_policy = policy;
            }
            let filters = Commands::build_filters(&doc_type, date, declaration.as_deref());
            let provider = document_file(file, &config)?;

            let documents = provider.load()?;
            let policy = config.action_policy;
            let visible: Vec<&Document> = apply_filters(&documents, &filters)
                .into_iter()
                .filter(|doc| policy.shows(doc))
                .collect();

            info!("Listing with filters [{}]", filters.describe());
            if visible.is_empty() {
                println!("No documents match: {}", filters.describe());
            } else {
                println!("{}", cli::listing_header());
                println!("{}", "-".repeat(80));
                for doc in &visible {
                    println!("{}", cli::listing_row(doc));
                }
                println!();
                println!("Total: {} of {} documents", visible.len(), documents.len());
            }
        }

        Commands::Suggest { partial, file } => {
            let provider = document_file(file, &config)?;
            let documents = provider.load()?;
            let candidates = suggest(&documents, &partial);
            if candidates.is_empty() {
                println!("No declaration numbers start with {}", partial);
            }
            for candidate in candidates {
                println!("{}", candidate);
            }
        }

        Commands::Tui { file } => {
            if file.is_some() {
                config.documents_file = file;
            }
            config.validate()?;

            info!("Starting docverify console...");
            if let Err(e) = run_tui(config).await {
                error!("Console failed: {}", e);
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Logs go to stderr and the log file, or only to the log file while the
/// console owns the terminal.
fn init_logging(config: &Config, console: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let directory = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ".".into());
    let file_name = config
        .log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "docverify.log".into());
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());

    let stderr_layer = (!console).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

/// The JSON file for the offline commands: `--file`, else the configured one.
fn document_file(file: Option<std::path::PathBuf>, config: &Config) -> Result<FileDocumentProvider> {
    let path = file
        .or_else(|| config.documents_file.clone())
        .context("No document file given. Pass --file or set DOCVERIFY_DOCUMENTS_FILE")?;
    if !path.is_file() {
        anyhow::bail!("Documents file does not exist: {}", path.display());
    }
    Ok(FileDocumentProvider::new(path))
}
