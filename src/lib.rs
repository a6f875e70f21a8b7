// feedback-report-service/src/lib.rs

pub mod aggregation;
pub mod config;
pub mod credentials;
pub mod error;
pub mod layout;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod renderers;
pub mod review;
pub mod routes;
