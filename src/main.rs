use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use shakescribe::{
    AppState,
    cache::{KvStore, MemoryStore, RedisStore},
    completion::CompletionClient,
    config::{Config, StoreBackend},
    create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置存储
    let store: Arc<dyn KvStore> = match config.store_backend {
        StoreBackend::Redis => {
            tracing::info!("Using Redis store at {}", config.redis_url);
            Arc::new(RedisStore::open(&config.redis_url).expect("Failed to create Redis client"))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, cached results and counters are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // 设置补全接口客户端
    let completion = CompletionClient::new(config.completion.clone())
        .expect("Failed to build completion HTTP client");
    if !completion.has_api_key() {
        tracing::warn!("COMPLETION_API_KEY is not set, generation requests will fail");
    }

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );

    // 设置应用状态
    let state = AppState::new(config, store, completion);
    let app = create_router(state);

    // 启动服务器
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
