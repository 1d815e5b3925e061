// Exports page collections as CSV files into the configured export directory.
//
// Usage: erp_export [slug ...]   (no slugs exports every page)

use tracing::info;
use tracing_subscriber::EnvFilter;

use erp_dashboard::{
    app_state::AppState,
    config::Config,
    framework::{CsvExport, FilterSpec},
    infrastructure::DirectorySink,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let sink = DirectorySink::new(config.export.dir.clone());
    let state = AppState::new(config)?;

    let requested: Vec<String> = std::env::args().skip(1).collect();
    let pages: Vec<_> = if requested.is_empty() {
        state.workspace.pages().to_vec()
    } else {
        requested
            .iter()
            .map(|slug| state.workspace.page(slug))
            .collect::<Result<_, _>>()?
    };

    let spec = FilterSpec::new();
    for page in &pages {
        let list = state.workspace.list(page.slug)?.read().await;
        let content = list.filter(&spec).export_csv(&page.columns);
        CsvExport::new(page.export_filename, content).deliver(&sink);
    }

    info!("Exported {} pages to {}", pages.len(), sink.dir().display());
    Ok(())
}
