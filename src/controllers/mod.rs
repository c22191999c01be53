pub mod dispatcher;
pub mod drainer;
pub mod engine;
pub mod queue;

pub use dispatcher::{BoundField, Dispatcher};
pub use drainer::{apply_callback, Diagnostics, MainTurnDrainer};
pub use engine::{Engine, StartOutcome, Status, StopOutcome, TickReport};
pub use queue::{CoalescingQueue, DrainReport};
