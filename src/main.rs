use anyhow::Result;
use pollscraper::{
    pipeline::{self, PipelineOptions},
    sources,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) resolve database path and source list ────────────────────
    let mut args = std::env::args().skip(1);
    let db_path = PathBuf::from(args.next().unwrap_or_else(|| "data.sqlite".to_string()));
    let sources = match args.next() {
        Some(config) => sources::load_sources(Path::new(&config))?,
        None => sources::default_sources(),
    };
    info!(db = %db_path.display(), sources = sources.len(), "configured");

    // ─── 3) scrape everything, one source at a time ──────────────────
    let summary = pipeline::run(&db_path, &sources, PipelineOptions::default())?;

    info!(
        records = summary.records,
        skips = summary.skips,
        sources = summary.sources_ok,
        "all done"
    );
    Ok(())
}
