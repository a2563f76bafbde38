pub mod item_ctx;
pub mod progress;
pub mod state;

pub use item_ctx::{ItemCtx, Stage};
pub use progress::PipelineProgress;
pub use state::PipelineState;
