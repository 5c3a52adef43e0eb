// File: src/persistence.rs
use crate::core::lettering::LetteringScheme;
use crate::core::types::PieceType;
use crate::error::{CommError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::warn;

/// What the finder remembers between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub lettering: Option<String>,
    pub piece_type: Option<PieceType>,
}

impl SessionState {
    /// The stored lettering, if it is still a valid scheme. An invalid stored
    /// value is ignored, never half-applied.
    pub fn lettering_scheme(&self) -> Option<LetteringScheme> {
        let stored = self.lettering.as_deref()?;
        match LetteringScheme::new(stored) {
            Ok(scheme) => Some(scheme),
            Err(e) => {
                warn!("ignoring stored lettering {:?}: {}", stored, e);
                None
            }
        }
    }

    /// Only validated schemes reach this point, so nothing invalid is saved.
    /// The canonical lettering is stored as no lettering at all.
    pub fn remember_lettering(&mut self, scheme: Option<&LetteringScheme>) {
        self.lettering = scheme
            .filter(|s| !s.is_canonical())
            .map(|s| s.to_string());
    }
}

pub fn save_to_disk(state: &SessionState, path: &Path) -> Result<()> {
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, state)?;
        writer.flush()?;
    }

    temp_file
        .persist(path)
        .map_err(|e| CommError::Io(e.error))?;
    Ok(())
}

/// Decodes from the whole file in memory so a bad length prefix is checked
/// against the bytes actually present.
pub fn load_from_disk(path: &Path) -> Result<SessionState> {
    let bytes = fs::read(path)?;
    let state: SessionState = bincode::deserialize(&bytes)?;
    Ok(state)
}

/// A missing or unreadable file starts a fresh session.
pub fn load_or_default(path: &Path) -> SessionState {
    match load_from_disk(path) {
        Ok(state) => state,
        Err(e) => {
            if path.exists() {
                warn!("could not read session state from {}: {}", path.display(), e);
            }
            SessionState::default()
        }
    }
}
