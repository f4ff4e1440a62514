//! HTTP 服务启动与优雅关闭

use std::net::SocketAddr;
use std::time::Duration;

use ruller_shared::config::AppConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{routes, state::AppState};

/// 在配置的地址上启动服务，直到收到关闭信号
pub async fn serve(config: &AppConfig, state: AppState) -> anyhow::Result<()> {
    let timeout = match config.server.request_timeout_seconds {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let app = routes::app(state, timeout);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 需要 ConnectInfo 才能在缺少 X-Forwarded-For 时获取调用方地址
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("注册 Ctrl+C 处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("注册 SIGTERM 处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
