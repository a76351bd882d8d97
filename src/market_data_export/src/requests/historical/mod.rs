//! Historical daily-bar acquisition.
//!
//! [`window`] plans request windows, [`chunk`] fetches one window,
//! [`single_request`] stitches one symbol together and [`batch_request`] walks
//! the whole universe.

pub mod batch_request;
pub mod chunk;
pub mod pacing;
pub mod single_request;
pub mod window;

pub use batch_request::{BatchScheduler, RunSummary};
pub use chunk::{ChunkFailure, ChunkFetcher, ChunkOutcome};
pub use single_request::{Assembly, SeriesAssembler};
pub use window::plan_windows;
