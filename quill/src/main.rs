mod config;
mod error;
mod server;

use axum::serve;
use config::Config;
use error::{QuillError, Result};
use quill_infra::{DatabaseManager, DatabaseOptions};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|e| QuillError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| QuillError::Logging(e.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    init_tracing(&config)?;
    info!("Starting Quill...");

    // 初始化数据库连接
    let options = DatabaseOptions {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        run_migrations: config.database.run_migrations,
    };
    let db_manager = DatabaseManager::connect(&options).await?;

    // 初始化应用状态
    let app_state = server::init_app_state(&config, &db_manager);
    info!("Application state initialized");

    // 创建路由
    let app = quill_web::create_router(app_state);

    // 启动HTTP服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;
    info!("Server listening on {}", addr);

    serve(listener, app.into_make_service()).await?;

    Ok(())
}
