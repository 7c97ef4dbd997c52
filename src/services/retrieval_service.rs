use log::debug;

use crate::config::TOP_K_PASSAGES;
use crate::models::passage::RetrievedPassage;
use crate::models::report_index::ReportIndex;
use crate::services::embedding_service::EmbeddingModel;
use crate::services::llm_service::LlmError;

/// Embeds the query and returns the top-k report passages by cosine
/// similarity. An empty index short-circuits without an embeddings
/// call.
pub async fn get_context(
    query: &str,
    index: &ReportIndex,
    embedder: &dyn EmbeddingModel,
) -> Result<Vec<RetrievedPassage>, LlmError> {
    if index.is_empty() {
        debug!("Report index is empty; skipping retrieval");
        return Ok(Vec::new());
    }

    let query_embedding = embedder.embed(query).await?;
    Ok(index.search(&query_embedding, TOP_K_PASSAGES))
}
