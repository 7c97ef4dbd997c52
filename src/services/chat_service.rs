use log::{error, info, warn};
use serde::Serialize;

use crate::config::SYSTEM_PROMPT;
use crate::models::chart::ChartSpec;
use crate::models::message::ChatMessage;
use crate::models::passage::{format_passages, RetrievedPassage};
use crate::models::report_index::ReportIndex;
use crate::models::user_session::UserSession;
use crate::services::chart_service;
use crate::services::embedding_service::EmbeddingModel;
use crate::services::llm_service::{ChatModel, LlmError};
use crate::services::retrieval_service;

const NO_CHART_DATA_MESSAGE: &str = "No numerical data found in the context for visualization. \
Try asking about specific numbers, percentages, or values from the report.";

/// What the pipeline hands back to the gateway for one user turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
    pub sources: Vec<String>,
}

/// Runs one full request cycle: retrieve context, answer with either a
/// chart specification or a completion, and record the exchange in the
/// session history. Upstream failures degrade the answer instead of
/// erroring the pipeline.
pub async fn process_chat(
    user_input: &str,
    user_session: &mut UserSession,
    index: &ReportIndex,
    model: &dyn ChatModel,
    embedder: &dyn EmbeddingModel,
) -> ChatReply {
    let passages = match retrieval_service::get_context(user_input, index, embedder).await {
        Ok(passages) => passages,
        Err(e) => {
            warn!("Context retrieval failed, answering without context: {}", e);
            Vec::new()
        }
    };
    let sources = unique_sources(&passages);
    let context = format_passages(&passages);

    if chart_service::detect_visualization_request(user_input) {
        let chart_type = chart_service::detect_chart_type(user_input);
        let spec = chart_service::extract_chart_data(&context, chart_type);

        let reply = if spec.is_empty() {
            info!("Visualization requested but the context holds no numeric data");
            ChatReply {
                response: NO_CHART_DATA_MESSAGE.to_string(),
                chart: None,
                sources,
            }
        } else {
            let response = format!(
                "Generated {} chart with {} data points",
                spec.chart_type,
                spec.len()
            );
            ChatReply {
                response,
                chart: Some(spec),
                sources,
            }
        };
        user_session.record_exchange(
            ChatMessage::user(user_input.to_string()),
            ChatMessage::assistant(reply.response.clone()),
        );
        return reply;
    }

    let conversation = build_conversation(&user_session.history, &context, user_input);
    let response = match model.chat(&conversation).await {
        Ok(content) => {
            if chart_service::detect_definition_request(user_input) {
                chart_service::format_definition_response(&content)
            } else {
                content
            }
        }
        Err(e) => {
            error!("Chat completion failed: {}", e);
            degraded_reply(&e)
        }
    };

    user_session.record_exchange(
        ChatMessage::user(user_input.to_string()),
        ChatMessage::assistant(response.clone()),
    );
    ChatReply {
        response,
        chart: None,
        sources,
    }
}

/// System prompt, then the retrieved context, then the session history
/// and the new user turn.
fn build_conversation(
    history: &[ChatMessage],
    context: &str,
    user_input: &str,
) -> Vec<ChatMessage> {
    let context_message = if context.is_empty() {
        "No relevant passages were found in the report index for this question. \
Say so when the report is required, or answer from general knowledge."
            .to_string()
    } else {
        format!(
            "Context from the KFH Real Estate Report 2025 Q1:\n{}",
            context
        )
    };

    let mut conversation = vec![
        ChatMessage::system(SYSTEM_PROMPT.to_string()),
        ChatMessage::system(context_message),
    ];
    conversation.extend(history.iter().cloned());
    conversation.push(ChatMessage::user(user_input.to_string()));
    conversation
}

fn degraded_reply(error: &LlmError) -> String {
    if error.is_quota_exhausted() {
        "The assistant has reached its usage quota. Please try again later.".to_string()
    } else {
        "The assistant could not reach the language model right now. Please try again in a moment."
            .to_string()
    }
}

fn unique_sources(passages: &[RetrievedPassage]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for passage in passages {
        if !sources.contains(&passage.origin) {
            sources.push(passage.origin.clone());
        }
    }
    sources
}
