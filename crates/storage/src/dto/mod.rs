pub mod run_order;
pub mod scoring;
