// src/services/mod.rs
pub mod correlation;
pub mod explainer;
pub mod parser;
pub mod projection;
pub mod quiz;
pub mod safety;
pub mod trend;
