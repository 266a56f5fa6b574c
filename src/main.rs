mod app;

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::info;

use docgraph::corpus::FileCorpus;
use docgraph::telemetry::init_tracing;
use docgraph::{EngineConfig, EngineServices};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON corpus: an array of documents or `{ "documents": [...] }`.
    #[arg(long, default_value = "demos/sample_corpus.json")]
    corpus: PathBuf,
    /// TOML or JSON engine configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "info")]
    log_filter: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_filter);

    let config = EngineConfig::load(args.config.as_deref()).with_context(|| {
        format!(
            "failed to load configuration from {}",
            args.config
                .as_deref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "environment".to_owned())
        )
    })?;
    let services = EngineServices::local(FileCorpus::new(&args.corpus), &config);
    let corpus_label = args.corpus.display().to_string();
    info!(corpus = %corpus_label, "starting viewer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "docgraph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::DocGraphApp::new(
                cc,
                services,
                config,
                corpus_label,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
