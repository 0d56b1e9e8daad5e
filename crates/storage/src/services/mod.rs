pub mod comparator;
pub mod generation;
pub mod lane;
pub mod placement;
pub mod ranking;
pub mod run_order;
pub mod scoring;
pub mod scoring_group;
