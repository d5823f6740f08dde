//! Command stream handling
//!
//! - [`buffered`]: line-budgeted command buffer
//! - [`compiler`]: pixel moves to controller commands
//! - [`replay`]: controller commands back to pixel positions

pub mod buffered;
pub mod compiler;
pub mod replay;

pub use buffered::{CommandBuffer, DEFAULT_LINE_BUDGET};
pub use compiler::{MachineState, MotionCompiler, MotionParameters};
pub use replay::{CommandReplay, ReplayEvent};
