pub mod attempt_note;
pub mod competition;
pub mod entry;
pub mod event;
pub mod event_result;
pub mod lane_assignment;
pub mod run_slot;

pub use attempt_note::AttemptNote;
pub use competition::Competition;
pub use entry::Entry;
pub use event::{Event, EventKind, ParseEnumError};
pub use event_result::EventResult;
pub use lane_assignment::LaneAssignment;
pub use run_slot::{RunSlot, SlotStatus};
