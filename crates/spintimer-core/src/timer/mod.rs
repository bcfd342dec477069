mod driver;
mod engine;
mod interval;
mod projection;
mod sequence;
mod session;

pub use driver::{TickDriver, TickFlow};
pub use engine::{Command, RunMode, SessionEngine, SessionState};
pub use interval::{is_hex_color, IntervalCategory, IntervalDefinition};
pub use projection::{format_clock, Projection};
pub use sequence::IntervalSequence;
pub use session::{SessionOptions, TrainingSession};
