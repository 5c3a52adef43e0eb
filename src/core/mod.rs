// src/core/mod.rs

pub mod canonical;
pub mod engine;
pub mod lettering;
pub mod ranking;
pub mod types;
