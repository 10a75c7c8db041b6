//! Server execution logic.

use std::{collections::HashMap, future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use kakehashi_shared::time::{Clock, unix_timestamp_millis};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::trace::TraceLayer;

use crate::{
    config::RelayConfig,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, rate_limiter::SlidingWindowRateLimiter,
        repository::InMemoryRoomRepository,
    },
    usecase::{
        ConnectPeerUseCase, CreateRoomUseCase, DisconnectPeerUseCase, ForwardFrameUseCase,
        GetRelayStatsUseCase, JoinRoomUseCase, ReapRoomsUseCase,
    },
};

use super::{
    handler::{get_stats, health_check, websocket_handler},
    reaper::spawn_reaper,
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket relay server
///
/// This struct owns the shared state handed to every connection and the
/// reaper that sweeps the registry alongside them.
///
/// # Example
///
/// ```ignore
/// let server = Server::from_config(&RelayConfig::default(), Arc::new(SystemClock));
/// server.run("0.0.0.0".to_string(), 9784).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// ReapRoomsUseCase（ルーム回収のユースケース）
    reap_rooms_usecase: Arc<ReapRoomsUseCase>,
    reap_interval: Duration,
}

impl Server {
    /// Create a new Server instance from already wired use cases
    pub fn new(
        state: AppState,
        reap_rooms_usecase: Arc<ReapRoomsUseCase>,
        reap_interval: Duration,
    ) -> Self {
        Self {
            state: Arc::new(state),
            reap_rooms_usecase,
            reap_interval,
        }
    }

    /// Wire the in-memory registry, rate limiter and WebSocket pusher into a server.
    ///
    /// Dependencies are created in order:
    /// 1. Repository
    /// 2. RateLimiter
    /// 3. MessagePusher
    /// 4. UseCases
    pub fn from_config(config: &RelayConfig, clock: Arc<dyn Clock>) -> Self {
        // 1. Create Repository (in-memory room registry)
        let repository = Arc::new(InMemoryRoomRepository::new(
            config.registry_settings(),
            clock.clone(),
        ));

        // 2. Create RateLimiter
        let rate_limiter = Arc::new(SlidingWindowRateLimiter::new(clock.clone()));

        // 3. Create MessagePusher (WebSocket implementation)
        let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));

        // 4. Create UseCases
        let policy = config.rate_limit_policy();
        let state = AppState {
            connect_peer_usecase: Arc::new(ConnectPeerUseCase::new(message_pusher.clone())),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                rate_limiter.clone(),
                message_pusher.clone(),
                policy,
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                rate_limiter,
                message_pusher.clone(),
                policy,
            )),
            forward_frame_usecase: Arc::new(ForwardFrameUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                config.max_message_size,
            )),
            disconnect_peer_usecase: Arc::new(DisconnectPeerUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            get_relay_stats_usecase: Arc::new(GetRelayStatsUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
                config.room_ttl,
                unix_timestamp_millis(),
            )),
            message_pusher: message_pusher.clone(),
            trust_forwarded_for: config.trust_forwarded_for,
        };
        let reap_rooms_usecase = Arc::new(ReapRoomsUseCase::new(
            repository,
            message_pusher,
            clock,
            config.room_ttl,
        ));

        Self::new(state, reap_rooms_usecase, config.reap_interval)
    }

    fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/stats", get(get_stats))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the relay server until Ctrl+C or SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "0.0.0.0")
    /// * `port` - The port number to bind to (e.g., 9784)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// The reaper runs for exactly as long as the server does.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let reaper = spawn_reaper(self.reap_rooms_usecase.clone(), self.reap_interval);

        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await;

        reaper.abort();
        result
    }
}
