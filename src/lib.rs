// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod persistence;
pub mod repository;

pub use crate::core::engine::{CommutatorLookup, LookupOutcome, LookupResult};
pub use crate::core::lettering::LetteringScheme;
pub use crate::core::types::{Pattern, PieceType};
pub use crate::error::{CommError, Result};
pub use crate::repository::DatasetRepository;
