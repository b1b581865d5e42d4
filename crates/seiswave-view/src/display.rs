//! The waveform display shell.
//!
//! [`WaveformDisplay`] owns the zoom controller, the claim-check store
//! handle, and the frame scheduler, and surfaces what the host needs to
//! react to as [`DisplayEvent`]s on a channel: accepted zoom changes,
//! max-zoom notifications, and debounced boundary updates.

use log::debug;
use seiswave_core::boundaries::{BoundariesAccumulator, CameraBounds};
use seiswave_core::position_buffer::to_position_buffer;
use seiswave_core::{DataBySampleRate, PositionBufferError, TimeRange, ZoomController, ZoomOutcome};
use seiswave_store::{ClaimCheckError, ClaimCheckId, ClaimCheckStore, StoreError};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::scheduler::FrameScheduler;

/// Errors from display operations.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error(transparent)]
    ClaimCheck(#[from] ClaimCheckError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    PositionBuffer(#[from] PositionBufferError),
}

/// Events the host reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// The zoom interval changed; re-render.
    ZoomChanged(TimeRange),
    /// A requested zoom was clamped or rejected by a platform limit.
    /// A user notification, not an error.
    MaxZoomReached,
    /// Debounced boundary recomputation finished. `None` when no
    /// displayed samples fell in the window.
    BoundariesUpdated(Option<CameraBounds>),
}

/// How to run a position-buffer computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeMode {
    /// Compute and store before returning.
    Awaited,
    /// Register the computation and drive it on a background task.
    Parallelize,
}

/// Ties the zoom controller, store, and scheduler together for one
/// display instance.
pub struct WaveformDisplay {
    zoom: ZoomController,
    store: ClaimCheckStore,
    scheduler: FrameScheduler,
    events: mpsc::UnboundedSender<DisplayEvent>,
    gl_range: [f64; 2],
    displayed_ids: Vec<String>,
}

impl WaveformDisplay {
    /// Create a display and the event stream the host listens on.
    #[must_use]
    pub fn new(
        display_interval: TimeRange,
        canvas_width_px: f64,
        gl_range: [f64; 2],
        store: ClaimCheckStore,
        scheduler: FrameScheduler,
    ) -> (Self, mpsc::UnboundedReceiver<DisplayEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                zoom: ZoomController::new(display_interval, canvas_width_px),
                store,
                scheduler,
                events,
                gl_range,
                displayed_ids: Vec::new(),
            },
            receiver,
        )
    }

    #[must_use]
    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomController {
        &mut self.zoom
    }

    /// Mark a claim-checked buffer as displayed so boundary updates
    /// include it.
    pub fn add_displayed_id(&mut self, encoded_id: &str) {
        if !self.displayed_ids.iter().any(|id| id == encoded_id) {
            self.displayed_ids.push(encoded_id.to_string());
        }
    }

    pub fn remove_displayed_id(&mut self, encoded_id: &str) {
        self.displayed_ids.retain(|id| id != encoded_id);
    }

    /// Request a zoom. Emits [`DisplayEvent::ZoomChanged`] for an
    /// accepted change, [`DisplayEvent::MaxZoomReached`] when clamped,
    /// and schedules a debounced boundary recomputation.
    pub fn set_zoom(&mut self, requested: TimeRange) -> ZoomOutcome {
        let outcome = self.zoom.set_zoom(requested);
        self.publish_zoom_outcome(&outcome);
        outcome
    }

    /// Zoom by a percentage anchored at a fractional canvas point.
    pub fn zoom_by_percentage_to_point(&mut self, zoom_pct: f64, x_frac: f64) -> ZoomOutcome {
        let outcome = self.zoom.zoom_by_percentage_to_point(zoom_pct, x_frac);
        self.publish_zoom_outcome(&outcome);
        outcome
    }

    fn publish_zoom_outcome(&self, outcome: &ZoomOutcome) {
        if outcome.max_zoom_reached {
            let _ = self.events.send(DisplayEvent::MaxZoomReached);
        }
        if outcome.changed {
            let _ = self.events.send(DisplayEvent::ZoomChanged(outcome.interval));
            self.schedule_boundary_update();
        }
    }

    /// Coalesce a boundary recomputation onto the next frame tick.
    pub fn schedule_boundary_update(&self) {
        let store = self.store.clone();
        let ids = self.displayed_ids.clone();
        let events = self.events.clone();
        self.scheduler.schedule(async move {
            let mut acc = BoundariesAccumulator::new();
            let mut boundaries = Vec::new();
            for id in &ids {
                if let Ok(buffer) = store.retrieve(id).await {
                    acc.add_position_buffer(&buffer, None);
                }
            }
            if let Some(bounds) = acc.finish() {
                boundaries.push(bounds);
            }
            let camera =
                seiswave_core::ChannelSegmentBoundaries::camera_bounds(&boundaries);
            debug!("boundary update over {} displayed buffers", ids.len());
            let _ = events.send(DisplayEvent::BoundariesUpdated(camera));
        });
    }

    /// Compute a position buffer for `data` and store it under `id`,
    /// unless one is already cached.
    ///
    /// Returns the encoded id. In [`ComputeMode::Parallelize`] the
    /// computation is registered as a pending entry and driven by a
    /// background task; retrievers that arrive before it finishes await
    /// the shared result.
    pub async fn calculate_and_store_position_buffer(
        &self,
        id: &ClaimCheckId,
        data: DataBySampleRate,
        mode: ComputeMode,
    ) -> Result<String, DisplayError> {
        let encoded = id.encode()?;
        if self.store.has(&encoded).await {
            return Ok(encoded);
        }

        let domain = id.domain;
        let gl_range = self.gl_range;
        match mode {
            ComputeMode::Awaited => {
                let buffer = to_position_buffer(&data, &domain, gl_range)?;
                self.store.store_if_absent(&encoded, buffer).await;
            }
            ComputeMode::Parallelize => {
                self.store
                    .store_pending(&encoded, async move {
                        to_position_buffer(&data, &domain, gl_range).map_err(|err| err.to_string())
                    })
                    .await;
                // Drive the shared computation so it completes without a
                // consumer.
                let store = self.store.clone();
                let encoded = encoded.clone();
                tokio::spawn(async move {
                    let _ = store.retrieve(&encoded).await;
                });
            }
        }
        Ok(encoded)
    }

    /// Drop every stored buffer and displayed id.
    pub async fn clear_waveforms(&mut self) {
        self.displayed_ids.clear();
        self.store.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seiswave_core::{ChannelSegmentId, TimeseriesType, WaveformDescriptor};
    use std::time::Duration;

    const CANVAS_WIDTH_PX: f64 = 1_000.0;
    const GL_RANGE: [f64; 2] = [0.0, 100.0];

    fn display() -> (WaveformDisplay, mpsc::UnboundedReceiver<DisplayEvent>) {
        WaveformDisplay::new(
            TimeRange::new(0.0, 3_600.0),
            CANVAS_WIDTH_PX,
            GL_RANGE,
            ClaimCheckStore::new(),
            FrameScheduler::new(Duration::from_millis(10)),
        )
    }

    fn claim_check(channel: &str) -> ClaimCheckId {
        ClaimCheckId::unfiltered(
            TimeRange::new(0.0, 3_600.0),
            ChannelSegmentId {
                channel_name: channel.to_string(),
                effective_at_secs: 0.0,
                start_time_secs: 0.0,
                end_time_secs: 100.0,
                creation_time_secs: 0.0,
            },
            WaveformDescriptor {
                timeseries_type: TimeseriesType::Waveform,
                start_time_secs: 0.0,
                end_time_secs: 100.0,
                sample_count: 4,
                sample_rate_hz: 40.0,
            },
        )
    }

    fn data() -> DataBySampleRate {
        DataBySampleRate {
            values: vec![1.0, -2.0, 3.0, -4.0],
            start_time_secs: 0.0,
            end_time_secs: 0.075,
            sample_rate_hz: 40.0,
        }
    }

    #[tokio::test]
    async fn test_set_zoom_emits_change_event() {
        let (mut display, mut events) = display();
        let outcome = display.set_zoom(TimeRange::new(600.0, 1_200.0));
        assert!(outcome.changed);

        let event = events.recv().await.unwrap();
        assert_eq!(event, DisplayEvent::ZoomChanged(TimeRange::new(600.0, 1_200.0)));
    }

    #[tokio::test]
    async fn test_clamped_zoom_emits_max_zoom_notification() {
        let (mut display, mut events) = display();
        display.set_zoom(TimeRange::new(1_000.0, 1_000.00001));

        let first = events.recv().await.unwrap();
        assert_eq!(first, DisplayEvent::MaxZoomReached);
        let second = events.recv().await.unwrap();
        assert!(matches!(second, DisplayEvent::ZoomChanged(_)));
    }

    #[tokio::test]
    async fn test_awaited_position_buffer_is_stored() {
        let (display, _events) = display();
        let id = claim_check("ASAR.AS01.SHZ");
        let encoded = display
            .calculate_and_store_position_buffer(&id, data(), ComputeMode::Awaited)
            .await
            .unwrap();

        let buffer = display.store.retrieve(&encoded).await.unwrap();
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer[1], 1.0);
        assert_eq!(buffer[3], -2.0);
    }

    #[tokio::test]
    async fn test_parallelize_mode_resolves_in_background() {
        let (display, _events) = display();
        let id = claim_check("ASAR.AS01.SHZ");
        let encoded = display
            .calculate_and_store_position_buffer(&id, data(), ComputeMode::Parallelize)
            .await
            .unwrap();

        // Entry exists immediately (pending) and resolves to the buffer.
        assert!(display.store.has(&encoded).await);
        let buffer = display.store.retrieve(&encoded).await.unwrap();
        assert_eq!(buffer.len(), 8);
    }

    #[tokio::test]
    async fn test_empty_domain_is_rejected() {
        let (display, _events) = display();
        let mut id = claim_check("ASAR.AS01.SHZ");
        id.domain = TimeRange::new(100.0, 100.0);

        let err = display
            .calculate_and_store_position_buffer(&id, data(), ComputeMode::Awaited)
            .await
            .unwrap_err();
        assert!(matches!(err, DisplayError::PositionBuffer(_)));
        assert!(display.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_existing_buffer_is_not_recomputed() {
        let (display, _events) = display();
        let id = claim_check("ASAR.AS01.SHZ");
        let encoded = id.encode().unwrap();
        display.store.store(&encoded, vec![7.0, 7.0]).await;

        let returned = display
            .calculate_and_store_position_buffer(&id, data(), ComputeMode::Awaited)
            .await
            .unwrap();
        assert_eq!(returned, encoded);
        assert_eq!(*display.store.retrieve(&encoded).await.unwrap(), vec![7.0, 7.0]);
    }

    #[tokio::test]
    async fn test_boundary_update_is_debounced_and_emitted() {
        let (mut display, mut events) = display();
        let id = claim_check("ASAR.AS01.SHZ");
        let encoded = display
            .calculate_and_store_position_buffer(&id, data(), ComputeMode::Awaited)
            .await
            .unwrap();
        display.add_displayed_id(&encoded);

        // Two quick zooms coalesce to one boundary update.
        display.set_zoom(TimeRange::new(10.0, 1_000.0));
        display.set_zoom(TimeRange::new(20.0, 1_000.0));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut boundary_updates = 0;
        while let Ok(event) = events.try_recv() {
            if let DisplayEvent::BoundariesUpdated(camera) = event {
                boundary_updates += 1;
                let camera = camera.unwrap();
                assert!(camera.top > camera.bottom);
            }
        }
        assert_eq!(boundary_updates, 1);
    }

    #[tokio::test]
    async fn test_clear_waveforms_empties_store_and_ids() {
        let (mut display, _events) = display();
        let id = claim_check("ASAR.AS01.SHZ");
        let encoded = display
            .calculate_and_store_position_buffer(&id, data(), ComputeMode::Awaited)
            .await
            .unwrap();
        display.add_displayed_id(&encoded);

        display.clear_waveforms().await;
        assert!(display.store.is_empty().await);
        assert!(display.displayed_ids.is_empty());
    }
}
