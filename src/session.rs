//! Session-scoped dataset cache.
//!
//! Normalization is the only stage worth memoizing: filters and
//! aggregates are cheap recomputations over the in-memory dataset, but
//! re-parsing workbooks is not. A [`Session`] keys the loaded dataset
//! by a SHA-256 fingerprint of the input file contents and reloads
//! only when that fingerprint changes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info};
use sha2::{Digest, Sha256};

use crate::dataset::Dataset;

pub struct Session {
    fingerprint: String,
    dataset: Dataset,
}

impl Session {
    pub fn open(paths: &[PathBuf]) -> Result<Session> {
        let fingerprint = fingerprint(paths)?;
        let dataset = Dataset::load(paths)?;
        debug!("Session opened with fingerprint {fingerprint}");
        Ok(Session {
            fingerprint,
            dataset,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Re-reads the input files only if their combined content changed.
    /// Returns whether a reload happened.
    pub fn refresh(&mut self, paths: &[PathBuf]) -> Result<bool> {
        let current = fingerprint(paths)?;
        if current == self.fingerprint {
            debug!("Input files unchanged; reusing normalized dataset");
            return Ok(false);
        }
        info!("Input files changed; re-normalizing");
        self.dataset = Dataset::load(paths)?;
        self.fingerprint = current;
        Ok(true)
    }
}

fn fingerprint(paths: &[PathBuf]) -> Result<String> {
    let mut hasher = Sha256::new();
    for path in paths {
        hasher.update(path.display().to_string().as_bytes());
        let contents = std::fs::read(path)
            .with_context(|| format!("Reading {:?} for session fingerprint", path))?;
        hasher.update(&contents);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
