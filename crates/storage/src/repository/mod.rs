pub mod attempt_note;
pub mod competition;
pub mod entry;
pub mod event;
pub mod event_result;
pub mod lane_assignment;
pub mod run_slot;
