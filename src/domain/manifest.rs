//! Transcript manifest: the participant-to-transcript index.
//!
//! Written by the upstream prepare step; this engine only reads it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// One transcript entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptEntry {
    /// Transcript identifier, e.g. `T01`.
    pub id: String,
    /// Participant identifier, e.g. `P01`.
    pub participant_id: String,
    /// Transcript path, relative to the pipeline root.
    pub path: PathBuf,
}

/// The manifest file: an index of every transcript in the run.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub transcripts: Vec<TranscriptEntry>,
}

impl Manifest {
    /// Parse a manifest from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Participant-id → absolute transcript path, resolved against `root`.
    ///
    /// A `BTreeMap` so iteration order (and thus any derived output) is
    /// deterministic.
    pub fn participant_paths(&self, root: &Path) -> BTreeMap<String, PathBuf> {
        self.transcripts
            .iter()
            .map(|t| (t.participant_id.clone(), root.join(&t.path)))
            .collect()
    }
}
