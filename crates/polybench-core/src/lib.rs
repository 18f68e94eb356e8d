pub mod config;
pub mod engine;
pub mod errors;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod schedule;
pub mod stats;
pub mod storage;
