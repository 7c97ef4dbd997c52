use serde::{Deserialize, Serialize};

/// Source metadata carried by every indexed passage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassageMetadata {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub page_numbers: Vec<u32>,
    #[serde(default)]
    pub title: Option<String>,
}

impl PassageMetadata {
    /// Citation string in the report's "file.pdf - p. 3, 4" form.
    pub fn citation(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(ref filename) = self.filename {
            parts.push(filename.clone());
        }
        if !self.page_numbers.is_empty() {
            let pages = self
                .page_numbers
                .iter()
                .map(|page| page.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("p. {}", pages));
        }
        if parts.is_empty() {
            "Unknown source".to_string()
        } else {
            parts.join(" - ")
        }
    }
}

/// One search hit. Built fresh per query, never persisted.
/// `score` is clamped to [0, 1].
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedPassage {
    pub excerpt: String,
    pub score: f32,
    pub origin: String,
    pub title: Option<String>,
}

/// Formats retrieved passages into the context block handed to the
/// model: passage text, then its source citation, blank-line separated.
pub fn format_passages(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|passage| {
            let mut block = format!("{}\nSource: {}", passage.excerpt, passage.origin);
            if let Some(ref title) = passage.title {
                block.push_str(&format!("\nTitle: {}", title));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_includes_filename_and_pages() {
        let metadata = PassageMetadata {
            filename: Some("KFH_Real_Estate_Report_2025_Q1.pdf".to_string()),
            page_numbers: vec![3, 4],
            title: Some("Residential Market".to_string()),
        };
        assert_eq!(
            metadata.citation(),
            "KFH_Real_Estate_Report_2025_Q1.pdf - p. 3, 4"
        );
    }

    #[test]
    fn citation_falls_back_when_metadata_is_empty() {
        assert_eq!(PassageMetadata::default().citation(), "Unknown source");
    }

    #[test]
    fn context_block_carries_source_and_title_lines() {
        let passages = vec![
            RetrievedPassage {
                excerpt: "Credit grew in Q1.".to_string(),
                score: 0.9,
                origin: "report.pdf - p. 2".to_string(),
                title: Some("Credit".to_string()),
            },
            RetrievedPassage {
                excerpt: "Supply remained flat.".to_string(),
                score: 0.7,
                origin: "report.pdf - p. 5".to_string(),
                title: None,
            },
        ];
        let block = format_passages(&passages);
        assert!(block.contains("Credit grew in Q1.\nSource: report.pdf - p. 2\nTitle: Credit"));
        assert!(block.contains("\n\nSupply remained flat.\nSource: report.pdf - p. 5"));
    }
}
