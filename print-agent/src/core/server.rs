//! Server Implementation
//!
//! HTTP / WebSocket server startup and graceful shutdown

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::api;
use crate::core::{AppState, Config, Result, ServerError};

/// HTTP / WebSocket server
pub struct Server {
    config: Config,
    state: Option<AppState>,
    shutdown: CancellationToken,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Create server with existing state (e.g. a custom spooler)
    pub fn with_state(config: Config, state: AppState) -> Self {
        Self {
            config,
            state: Some(state),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the server when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;

        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C received");
            }
            shutdown.cancel();
        });

        self.serve(listener).await
    }

    /// Serve on an already bound listener until the shutdown token fires
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => AppState::new(&self.config),
        };

        let local_addr = listener.local_addr()?;
        tracing::info!(
            addr = %local_addr,
            paper_width = self.config.paper_width,
            code_page = %self.config.code_page,
            api_base_url = %self.config.api_base_url,
            "🖨️ Print agent listening on ws://{}",
            local_addr
        );

        let clients = state.clients.clone();
        let sessions = state.clients.clone();
        let shutdown = self.shutdown.clone();
        let app = api::router(state).into_make_service_with_connect_info::<SocketAddr>();

        // axum does not track upgraded connections; sessions end after the job in hand
        let server = async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown.cancelled().await;
                    tracing::info!("Shutting down...");
                    clients.close_all();
                })
                .await?;

            tracing::info!(sessions = sessions.count(), "Waiting for client sessions");
            sessions.wait_idle().await;
            Ok::<_, ServerError>(())
        };

        let timeout = self.config.shutdown_timeout();
        let deadline = async {
            self.shutdown.cancelled().await;
            tokio::time::sleep(timeout).await;
        };

        tokio::select! {
            result = server => result?,
            _ = deadline => {
                tracing::warn!(?timeout, "Graceful shutdown timed out, dropping remaining connections");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}
