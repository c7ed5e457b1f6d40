//! Liveness and readiness checks for orchestrators and load balancers.
//!
//! Readiness additionally round-trips the backing store, so a node whose
//! database is unreachable drops out of rotation instead of answering 503s
//! on every business endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::warn;

use crate::domain::ports::StoreHealth;

/// Process-wide health state.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    store: Option<Arc<dyn StoreHealth>>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            store: None,
        }
    }
}

impl HealthState {
    /// Not ready, live, with no store dependency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make readiness depend on `store` answering a ping.
    pub fn with_store(mut self, store: Arc<dyn StoreHealth>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness so orchestrators stop routing during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    async fn store_reachable(&self) -> bool {
        let Some(store) = self.store.as_ref() else {
            return true;
        };
        match store.ping().await {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "readiness check: store unreachable");
                false
            }
        }
    }

    fn check_response(healthy: bool) -> HttpResponse {
        let mut response = if healthy {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness check: 200 once started and the store answers, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is starting or its store is unreachable")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    let ok = state.is_ready() && state.store_reachable().await;
    HealthState::check_response(ok)
}

/// Liveness check: 200 while alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::check_response(state.is_alive())
}
