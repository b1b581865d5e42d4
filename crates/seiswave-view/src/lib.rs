//! Display-side orchestration of the waveform pipeline.
//!
//! - [`scheduler`]: the frame-coalesced work scheduler that debounces
//!   boundary recomputation after zoom changes
//! - [`display`]: the [`WaveformDisplay`] shell tying the zoom
//!   controller, claim-check store, and scheduler together and surfacing
//!   display events to the host

pub mod display;
pub mod scheduler;

pub use display::{ComputeMode, DisplayError, DisplayEvent, WaveformDisplay};
pub use scheduler::FrameScheduler;
