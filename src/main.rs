use std::sync::Arc;

mod config;
mod handlers;
mod middleware;
mod prompb;
mod server;
mod wavefront;

use wavefront::{ConnectionPool, Writer};

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Pool-backed writer that ships metric lines to the Wavefront proxy.
    pub writer: Writer,
}

#[tokio::main]
async fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   📡  PROMETHEUS → WAVEFRONT RELAY              ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    // ── 1. Load configuration ────────────────────────────────────
    let cfg = config::Config::from_env();
    println!("🔧 proxy  = {}", cfg.proxy_addr);
    println!("   prefix = {}", cfg.prefix);

    // ── 2. Build the write pipeline ──────────────────────────────
    // Connections are dialed lazily on the first incoming batch, so
    // startup succeeds even while the proxy is still coming up.
    let pool = ConnectionPool::new(cfg.proxy_addr.clone(), wavefront::MAX_CONNECTIONS);
    let state = Arc::new(AppState {
        writer: Writer::new(cfg.prefix.clone(), pool),
    });

    // ── 3. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state);

    // ── 4. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("❌ Cannot bind {}: {e}", cfg.listen_addr);
            std::process::exit(1);
        });

    println!();
    println!("Server listening on http://{}", cfg.listen_addr);
    println!("Remote write    → POST http://{}/receive", cfg.listen_addr);
    println!("Liveness        → GET  http://{}/healthz", cfg.listen_addr);
    println!();

    axum::serve(listener, app)
        .await
        .expect("Server exited with error");
}
