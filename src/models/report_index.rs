use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::passage::{PassageMetadata, RetrievedPassage};
use crate::utils::similarity::cosine_similarity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPassage {
    pub text: String,
    #[serde(default)]
    pub metadata: PassageMetadata,
    pub embedding: Vec<f32>,
}

/// The prebuilt passage index for one report, loaded once at startup
/// from `DB_PATH` and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportIndex {
    #[serde(default)]
    pub report_title: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub passages: Vec<IndexedPassage>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportIndexError {
    #[error("Report index not found at {path}; check DB_PATH")]
    NotFound { path: String },

    #[error("Failed to read report index: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report index is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ReportIndex {
    pub fn load(path: &str) -> Result<Self, ReportIndexError> {
        if !Path::new(path).exists() {
            return Err(ReportIndexError::NotFound {
                path: path.to_string(),
            });
        }
        let raw = fs::read_to_string(path)?;
        let index: ReportIndex = serde_json::from_str(&raw)?;
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Brute-force cosine search, descending score, at most `top_k`
    /// hits. Scores are clamped to [0, 1]; a passage with a mismatched
    /// embedding dimension scores 0.
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Vec<RetrievedPassage> {
        let mut results: Vec<RetrievedPassage> = self
            .passages
            .iter()
            .map(|passage| RetrievedPassage {
                excerpt: passage.text.clone(),
                score: cosine_similarity(&passage.embedding, query_embedding).clamp(0.0, 1.0),
                origin: passage.metadata.citation(),
                title: passage.metadata.title.clone(),
            })
            .collect();
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);
        results
    }
}
