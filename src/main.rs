// ERP Dashboard Server

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use erp_dashboard::{api::create_router, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("erp_dashboard=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let addr = config.server_address();

    // Initialize application state
    let app_state = AppState::new(config)?;
    info!("Loaded {} pages", app_state.workspace.pages().len());

    let app = create_router(app_state);

    println!("🚀 ERP Dashboard starting on http://{}", addr);
    println!("📋 API Documentation:");
    println!("  POST   /login                                  - Start a session");
    println!("  POST   /logout                                 - End the session");
    println!("  GET    /dashboard                              - Per-page summaries");
    println!("  GET    /api/pages/{{slug}}?search=&<facet>=      - Filtered page view");
    println!("  POST   /api/pages/{{slug}}/records               - Add record");
    println!("  PUT    /api/pages/{{slug}}/records/{{id}}          - Update record");
    println!("  DELETE /api/pages/{{slug}}/records/{{id}}          - Remove record");
    println!("  GET    /api/pages/{{slug}}/export                - CSV download");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
