mod machine;
mod registry;
mod view;

// Public API of the study subsystem.
pub use crate::error::StudyError;
pub use machine::{FlipAck, StudyService};
pub use registry::{SessionLimits, SessionRegistry, SharedSession};
pub use view::{CardView, PageView, TrackSummary};
