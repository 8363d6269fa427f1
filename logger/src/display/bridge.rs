use crate::display::model::LiveModel;
use rakecore::telemetry::MetricsSnapshot;
use rakecore::Reading;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::Filter;

/// Owns the single "latest reading" cell shared with external renderers.
/// Publishing is last-value-wins; there is no queue and no back-pressure,
/// matching how a ring display consumes state.
pub struct DisplayBridge {
    state: Arc<RwLock<LiveModel>>,
    history_len: usize,
}

impl DisplayBridge {
    pub fn new(history_len: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(LiveModel::default())),
            history_len,
        }
    }

    /// Hosts `GET /latest` and `GET /health` on a background thread so a
    /// touchscreen renderer (or the analyzer's live view) can poll state.
    pub fn serve(&self, address: SocketAddr) {
        let state_for_filter = self.state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());

        let latest_route = warp::path("latest")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<LiveModel>>| warp::reply::json(&*state.read().unwrap()));

        let health_route = warp::path("health")
            .and(warp::get())
            .map(|| warp::reply::json(&json!({"status": "ok"})));

        thread::spawn(move || {
            let routes = latest_route.or(health_route);
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        });
        log::info!("display bridge listening on {}", address);
    }

    pub fn publish(&self, reading: &Reading, metrics: MetricsSnapshot) {
        let mut guard = self.state.write().unwrap();
        guard.absorb(reading, self.history_len);
        guard.rows_logged = metrics.rows_logged;
        guard.read_failures = metrics.read_failures;
    }

    pub fn publish_status(&self, message: &str) {
        log::info!("[display] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> LiveModel {
        self.state.read().unwrap().clone()
    }
}
