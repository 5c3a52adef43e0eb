//! Configuration for the commutator finder
//!
//! CLI arguments and environment variable handling using clap.

use crate::core::lettering::LetteringScheme;
use crate::core::types::PieceType;
use crate::error::{CommError, Result};
use crate::repository::{DatasetSource, DirectorySource, HttpSource};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Look up known three-cycle commutators by letter pair, in your own lettering.
#[derive(Parser, Debug, Clone)]
#[command(name = "comm_finder")]
#[command(about = "Find blindfolded commutators for a three-letter case")]
pub struct Args {
    /// Three letters to look up. Starts an interactive session when omitted.
    pub query: Option<String>,

    /// Piece type (corner, edge, wing, midge, xcenter, tcenter,
    /// left-oblique, right-oblique or a dataset name like Corner3Cycle)
    #[arg(short, long, env = "COMM_PIECE_TYPE")]
    pub piece_type: Option<String>,

    /// 24-letter custom lettering, position order UBL UBR UFR ... for corners
    #[arg(short, long, env = "COMM_LETTERING")]
    pub lettering: Option<String>,

    /// Base URL the per-piece-type JSON files are served from.
    /// Takes precedence over --data-dir when set.
    #[arg(long, env = "COMM_DATA_URL")]
    pub data_url: Option<String>,

    /// Directory holding Corner3Cycle.json, Edge3Cycle.json, ...
    #[arg(long, env = "COMM_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Where the last lettering and piece type are remembered
    #[arg(long, env = "COMM_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, env = "COMM_TIMEOUT_SECS", default_value = "120")]
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Print results as JSON instead of tables
    #[arg(long, default_value = "false")]
    pub json: bool,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(piece_type) = &self.piece_type {
            piece_type.parse::<PieceType>()?;
        }
        if let Some(lettering) = &self.lettering {
            LetteringScheme::new(lettering)?;
        }
        if let Some(url) = &self.data_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CommError::Config(format!("data URL must be http(s): {}", url)));
            }
        }
        if self.timeout_secs == 0 {
            return Err(CommError::Config("timeout must be at least one second".into()));
        }
        Ok(())
    }

    /// Piece type from the command line, if one was given.
    pub fn piece_type(&self) -> Result<Option<PieceType>> {
        self.piece_type.as_deref().map(str::parse::<PieceType>).transpose()
    }

    /// Lettering from the command line, if one was given.
    pub fn lettering(&self) -> Result<Option<LetteringScheme>> {
        self.lettering.as_deref().map(LetteringScheme::new).transpose()
    }

    pub fn dataset_source(&self) -> Result<Arc<dyn DatasetSource>> {
        match &self.data_url {
            Some(url) => Ok(Arc::new(HttpSource::new(
                url.clone(),
                Duration::from_secs(self.timeout_secs),
            )?)),
            None => Ok(Arc::new(DirectorySource::new(self.data_dir.clone()))),
        }
    }

    /// Explicit path, else `<config dir>/comm-finder/session.bin`, else the
    /// working directory.
    pub fn state_path(&self) -> PathBuf {
        if let Some(path) = &self.state_file {
            return path.clone();
        }
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("comm-finder");
        path.push("session.bin");
        path
    }
}
