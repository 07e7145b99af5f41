pub mod activity;
pub mod progress;
