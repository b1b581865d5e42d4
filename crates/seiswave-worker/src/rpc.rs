//! The worker pool and its request/response protocol.
//!
//! Requests are dispatched by name over an in-process channel to a fixed
//! number of worker tasks sharing one claim-check store. Each call has
//! exactly one request and one eventual response. Sample buffers never
//! travel in requests or responses; only claim-check ids do.

use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, error};
use seiswave_export::{
    export_channel_segments, ExportBlob, ExportChannelSegment, ExportError, FilterAssociation,
};
use seiswave_filter::{
    design_filter, DesignError, FilterDefinition, FilterPipeline, FilteredChannelSegment,
    FiltersBySampleRate, SampleRateKey, UiChannelSegment,
};
use seiswave_store::ClaimCheckStore;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::cancel::CancellationToken;
use crate::fetch::{FetchClient, FetchError, FilterDefinitionsByUsage, FilterDefinitionsRequest};

/// Errors from worker calls.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The call was aborted by the caller. A non-error termination:
    /// never logged at error level, never retried.
    #[error("worker request cancelled")]
    Cancelled,
    #[error(transparent)]
    Design(#[from] DesignError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Fetch(FetchError),
    #[error("worker pool is shut down")]
    PoolShutDown,
}

/// Named operations the pool understands.
#[derive(Debug)]
pub enum WorkerRequest {
    DesignFilter {
        definition: FilterDefinition,
        sample_rates_hz: Vec<f64>,
        taper_samples: usize,
        remove_group_delay: bool,
    },
    FilterChannelSegments {
        segments: Vec<UiChannelSegment>,
        filters: FiltersBySampleRate,
    },
    ExportChannelSegments {
        segments: Vec<ExportChannelSegment>,
        filter_associations: Vec<FilterAssociation>,
    },
    FetchFilterDefinitions(FilterDefinitionsRequest),
    ClearWaveforms,
}

/// Success payloads, one per request kind.
#[derive(Debug)]
pub enum WorkerResponse {
    DesignedFilters(FiltersBySampleRate),
    FilteredChannelSegments(Vec<FilteredChannelSegment>),
    Exported(ExportBlob),
    FilterDefinitions(FilterDefinitionsByUsage),
    Cleared,
}

struct WorkerCall {
    request: WorkerRequest,
    reply: oneshot::Sender<Result<WorkerResponse, WorkerError>>,
    token: CancellationToken,
}

/// A fixed-size pool of worker tasks with explicit lifecycle.
///
/// Constructed per display instance rather than process-wide, so tests
/// and multiple displays get isolated pools. Dropping the pool closes
/// the request channel and lets the workers drain and exit.
pub struct WorkerPool {
    calls: mpsc::UnboundedSender<WorkerCall>,
    active_token: Mutex<CancellationToken>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers sharing `store` and `fetch`.
    #[must_use]
    pub fn new(size: usize, store: ClaimCheckStore, fetch: FetchClient) -> Self {
        let (calls, receiver) = mpsc::unbounded_channel::<WorkerCall>();
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..size.max(1))
            .map(|worker_id| {
                let receiver = Arc::clone(&receiver);
                let store = store.clone();
                let fetch = fetch.clone();
                tokio::spawn(worker_loop(worker_id, receiver, store, fetch))
            })
            .collect();

        Self {
            calls,
            active_token: Mutex::new(CancellationToken::new()),
            workers,
        }
    }

    /// Pool size matched to available hardware concurrency, capped at 4.
    #[must_use]
    pub fn default_size() -> usize {
        thread::available_parallelism().map_or(4, usize::from).min(4)
    }

    /// Dispatch one request and await its response.
    pub async fn call(&self, request: WorkerRequest) -> Result<WorkerResponse, WorkerError> {
        let token = self
            .active_token
            .lock()
            .expect("active token lock poisoned")
            .clone();
        let (reply, response) = oneshot::channel();
        self.calls
            .send(WorkerCall {
                request,
                reply,
                token,
            })
            .map_err(|_| WorkerError::PoolShutDown)?;
        response.await.map_err(|_| WorkerError::PoolShutDown)?
    }

    /// Cancel every outstanding call. Calls made after this proceed under
    /// a fresh token.
    pub fn cancel_requests(&self) {
        let mut active = self
            .active_token
            .lock()
            .expect("active token lock poisoned");
        active.cancel();
        *active = CancellationToken::new();
    }

    /// Stop accepting calls and let the workers drain.
    pub fn shutdown(self) {
        drop(self.calls);
        for worker in &self.workers {
            worker.abort();
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<WorkerCall>>>,
    store: ClaimCheckStore,
    fetch: FetchClient,
) {
    let pipeline = FilterPipeline::new(store.clone());
    loop {
        // Hold the receiver lock only while waiting for the next call so
        // idle workers can pick up queued requests.
        let call = receiver.lock().await.recv().await;
        let Some(call) = call else {
            break;
        };

        let result = if call.token.is_cancelled() {
            Err(WorkerError::Cancelled)
        } else {
            tokio::select! {
                () = call.token.cancelled() => Err(WorkerError::Cancelled),
                result = dispatch(call.request, &store, &pipeline, &fetch, &call.token) => result,
            }
        };

        match &result {
            Err(WorkerError::Cancelled) => debug!("worker {worker_id}: request cancelled"),
            Err(err) => error!("worker {worker_id}: request failed: {err}"),
            Ok(_) => {}
        }
        // The caller may have given up waiting.
        let _ = call.reply.send(result);
    }
    debug!("worker {worker_id}: shutting down");
}

async fn dispatch(
    request: WorkerRequest,
    store: &ClaimCheckStore,
    pipeline: &FilterPipeline,
    fetch: &FetchClient,
    token: &CancellationToken,
) -> Result<WorkerResponse, WorkerError> {
    match request {
        WorkerRequest::DesignFilter {
            definition,
            sample_rates_hz,
            taper_samples,
            remove_group_delay,
        } => {
            let mut filters = FiltersBySampleRate::new();
            for sample_rate_hz in sample_rates_hz {
                let designed =
                    design_filter(&definition, sample_rate_hz, taper_samples, remove_group_delay)?;
                filters.insert(SampleRateKey::from_hz(sample_rate_hz), designed);
            }
            Ok(WorkerResponse::DesignedFilters(filters))
        }
        WorkerRequest::FilterChannelSegments { segments, filters } => {
            let filtered = pipeline.filter_channel_segments(&segments, &filters).await;
            Ok(WorkerResponse::FilteredChannelSegments(filtered))
        }
        WorkerRequest::ExportChannelSegments {
            segments,
            filter_associations,
        } => {
            let blob = export_channel_segments(store, &segments, filter_associations).await?;
            Ok(WorkerResponse::Exported(blob))
        }
        WorkerRequest::FetchFilterDefinitions(request) => {
            let definitions = fetch
                .fetch_filter_definitions(&request, token)
                .await
                .map_err(|err| match err {
                    FetchError::Cancelled => WorkerError::Cancelled,
                    other => WorkerError::Fetch(other),
                })?;
            Ok(WorkerResponse::FilterDefinitions(definitions))
        }
        WorkerRequest::ClearWaveforms => {
            store.clear().await;
            Ok(WorkerResponse::Cleared)
        }
    }
}
