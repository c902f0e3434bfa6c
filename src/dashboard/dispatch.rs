//! Background request dispatcher
//!
//! Service calls run on a tokio runtime owned here. Their outcomes come back
//! to the UI thread as [`ApiEvent`]s over a crossbeam channel and are applied
//! on the next frame. Every spawned call produces exactly one event, even if
//! the task panics or is dropped with the runtime.

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::api::{
    ApiClient, ApiError, BatchRequest, BatchResponse, DetectRequest, DetectResponse,
    ExtractRequest, ExtractResponse, HealthResponse,
};
use crate::config::AppConfig;

/// Outcome of one service call
#[derive(Debug)]
pub enum ApiEvent {
    Detected(Result<DetectResponse, ApiError>),
    Extracted(Result<ExtractResponse, ApiError>),
    Batched(Result<BatchResponse, ApiError>),
    Health(Result<HealthResponse, ApiError>),
}

/// Runs service calls off the UI thread
pub struct Dispatcher {
    runtime: Runtime,
    config: Arc<RwLock<AppConfig>>,
    /// Client for the last used base URL
    client: Mutex<Option<ApiClient>>,
    events_tx: Sender<ApiEvent>,
    events_rx: Receiver<ApiEvent>,
    repaint: Option<egui::Context>,
}

impl Dispatcher {
    pub fn new(config: Arc<RwLock<AppConfig>>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("api-worker")
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;
        let (events_tx, events_rx) = unbounded();

        Ok(Self {
            runtime,
            config,
            client: Mutex::new(None),
            events_tx,
            events_rx,
            repaint: None,
        })
    }

    /// Wake the UI whenever an event is sent
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    /// Events that arrived since the last call
    pub fn drain(&self) -> Vec<ApiEvent> {
        self.events_rx.try_iter().collect()
    }

    pub fn detect(&self, request: DetectRequest) {
        debug!("Dispatching detection for {}", request.image.name);
        self.spawn(ApiEvent::Detected, move |client| async move {
            client.detect(&request).await
        });
    }

    pub fn extract_text(&self, request: ExtractRequest) {
        debug!("Dispatching OCR with model {}", request.model.as_str());
        self.spawn(ApiEvent::Extracted, move |client| async move {
            client.extract_text(&request).await
        });
    }

    pub fn batch_detect(&self, request: BatchRequest) {
        debug!("Dispatching batch of {} files", request.files.len());
        self.spawn(ApiEvent::Batched, move |client| async move {
            client.batch_detect(&request).await
        });
    }

    pub fn check_health(&self) {
        self.spawn(ApiEvent::Health, |client| async move { client.health().await });
    }

    /// Client for the currently configured base URL
    fn client(&self) -> Result<ApiClient, ApiError> {
        let base_url = self.config.read().server.base_url.clone();
        let mut cached = self.client.lock();

        if let Some(client) = cached.as_ref() {
            if client.serves(&base_url) {
                return Ok(client.clone());
            }
        }

        let client = ApiClient::new(&base_url)?;
        debug!("Using detection service at {}", client.base_url());
        *cached = Some(client.clone());
        Ok(client)
    }

    fn spawn<T, F, Fut>(&self, wrap: fn(Result<T, ApiError>) -> ApiEvent, call: F)
    where
        T: Send + 'static,
        F: FnOnce(ApiClient) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let mut settle = Settle {
            tx: self.events_tx.clone(),
            wrap,
            outcome: None,
            repaint: self.repaint.clone(),
        };

        let client = match self.client() {
            Ok(client) => client,
            Err(err) => {
                settle.outcome = Some(Err(err));
                return;
            }
        };

        self.runtime.spawn(async move {
            let mut settle = settle;
            settle.outcome = Some(call(client).await);
        });
    }
}

/// Sends the outcome when dropped, [`ApiError::Aborted`] if none was recorded
struct Settle<T> {
    tx: Sender<ApiEvent>,
    wrap: fn(Result<T, ApiError>) -> ApiEvent,
    outcome: Option<Result<T, ApiError>>,
    repaint: Option<egui::Context>,
}

impl<T> Drop for Settle<T> {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or(Err(ApiError::Aborted));
        let _ = self.tx.send((self.wrap)(outcome));
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
    }
}
