use std::sync::Mutex;

use async_trait::async_trait;
use mockall::mock;

use MarkazChatAgent::config::SYSTEM_PROMPT;
use MarkazChatAgent::models::chart::ChartType;
use MarkazChatAgent::models::message::{ChatMessage, MessageRole};
use MarkazChatAgent::models::passage::PassageMetadata;
use MarkazChatAgent::models::report_index::{IndexedPassage, ReportIndex};
use MarkazChatAgent::models::user_session::UserSession;
use MarkazChatAgent::services::chat_service::process_chat;
use MarkazChatAgent::services::embedding_service::EmbeddingModel;
use MarkazChatAgent::services::llm_service::{ChatModel, LlmError};

mock! {
    pub Embedder {}

    #[async_trait]
    impl EmbeddingModel for Embedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;
    }
}

struct CannedModel {
    reply: &'static str,
}

#[async_trait]
impl ChatModel for CannedModel {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        Ok(self.reply.to_string())
    }
}

struct FailingModel {
    status: u16,
}

#[async_trait]
impl ChatModel for FailingModel {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        Err(LlmError::Api {
            status: self.status,
            message: "simulated failure".to_string(),
        })
    }
}

struct PanickingModel;

#[async_trait]
impl ChatModel for PanickingModel {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        panic!("the chart branch must not call the completion model");
    }
}

/// Captures every conversation it is handed.
struct RecordingModel {
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl RecordingModel {
    fn new() -> Self {
        RecordingModel {
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatModel for RecordingModel {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        Ok("ok".to_string())
    }
}

fn report_index() -> ReportIndex {
    ReportIndex {
        report_title: None,
        created_at: None,
        passages: vec![IndexedPassage {
            text: "Private Housing Credit directed: KD 10.5 billion".to_string(),
            metadata: PassageMetadata {
                filename: Some("report.pdf".to_string()),
                page_numbers: vec![7],
                title: None,
            },
            embedding: vec![1.0, 0.0],
        }],
    }
}

fn matching_embedder() -> MockEmbedder {
    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().returning(|_| Ok(vec![1.0, 0.0]));
    embedder
}

#[tokio::test]
async fn empty_index_still_produces_an_answer() {
    let mut session = UserSession::new(true);
    let index = ReportIndex::default();
    let model = CannedModel {
        reply: "The report does not cover that topic.",
    };
    // The empty index must short-circuit before any embeddings call.
    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().times(0);

    let reply = process_chat(
        "Is there anything about schools?",
        &mut session,
        &index,
        &model,
        &embedder,
    )
    .await;

    assert_eq!(reply.response, "The report does not cover that topic.");
    assert!(reply.chart.is_none());
    assert!(reply.sources.is_empty());
    assert_eq!(session.history.len(), 2);
}

#[tokio::test]
async fn conversation_layers_prompt_context_and_question() {
    let mut session = UserSession::new(true);
    let index = report_index();
    let model = RecordingModel::new();
    let embedder = matching_embedder();

    process_chat(
        "How did residential credit perform?",
        &mut session,
        &index,
        &model,
        &embedder,
    )
    .await;

    let calls = model.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let conversation = &calls[0];
    assert_eq!(conversation.len(), 3);

    assert_eq!(conversation[0].role, MessageRole::System);
    assert_eq!(conversation[0].content, SYSTEM_PROMPT);

    assert_eq!(conversation[1].role, MessageRole::System);
    assert!(conversation[1]
        .content
        .contains("Private Housing Credit directed"));
    assert!(conversation[1].content.contains("Source: report.pdf - p. 7"));

    assert_eq!(conversation[2].role, MessageRole::User);
    assert_eq!(conversation[2].content, "How did residential credit perform?");
}

#[tokio::test]
async fn history_is_replayed_on_later_turns() {
    let mut session = UserSession::new(true);
    let index = report_index();
    let model = RecordingModel::new();
    let embedder = matching_embedder();

    process_chat("First question", &mut session, &index, &model, &embedder).await;
    process_chat("Second question", &mut session, &index, &model, &embedder).await;

    assert_eq!(session.history.len(), 4);
    let calls = model.calls.lock().unwrap();
    let second = &calls[1];
    // system prompt + context + first exchange + new question
    assert_eq!(second.len(), 5);
    assert_eq!(second[2].content, "First question");
    assert_eq!(second[3].content, "ok");
    assert_eq!(second[4].content, "Second question");
}

#[tokio::test]
async fn quota_exhaustion_degrades_the_answer() {
    let mut session = UserSession::new(true);
    let index = report_index();
    let model = FailingModel { status: 429 };
    let embedder = matching_embedder();

    let reply = process_chat(
        "How did credit perform?",
        &mut session,
        &index,
        &model,
        &embedder,
    )
    .await;

    assert!(reply.response.contains("usage quota"));
    assert_eq!(session.history.len(), 2);
}

#[tokio::test]
async fn other_upstream_errors_degrade_generically() {
    let mut session = UserSession::new(true);
    let index = report_index();
    let model = FailingModel { status: 503 };
    let embedder = matching_embedder();

    let reply = process_chat(
        "How did credit perform?",
        &mut session,
        &index,
        &model,
        &embedder,
    )
    .await;

    assert!(reply.response.contains("could not reach the language model"));
}

#[tokio::test]
async fn embedding_failure_answers_without_context() {
    let mut session = UserSession::new(true);
    let index = report_index();
    let model = RecordingModel::new();
    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().returning(|_| {
        Err(LlmError::Api {
            status: 500,
            message: "embeddings down".to_string(),
        })
    });

    let reply = process_chat(
        "How did credit perform?",
        &mut session,
        &index,
        &model,
        &embedder,
    )
    .await;

    assert_eq!(reply.response, "ok");
    assert!(reply.sources.is_empty());
    let calls = model.calls.lock().unwrap();
    assert!(calls[0][1]
        .content
        .contains("No relevant passages were found"));
}

#[tokio::test]
async fn chart_requests_never_call_the_completion_model() {
    let mut session = UserSession::new(true);
    let index = report_index();
    let model = PanickingModel;
    let embedder = matching_embedder();

    let reply = process_chat(
        "Visualize residential credit by segment",
        &mut session,
        &index,
        &model,
        &embedder,
    )
    .await;

    let chart = reply.chart.expect("chart should be present");
    assert_eq!(chart.chart_type, ChartType::Bar);
    assert_eq!(reply.response, "Generated bar chart with 1 data points");
    assert_eq!(reply.sources, vec!["report.pdf - p. 7".to_string()]);
    assert_eq!(session.history.len(), 2);
}

#[tokio::test]
async fn chart_request_without_numbers_reports_no_data() {
    let mut session = UserSession::new(true);
    let index = ReportIndex {
        report_title: None,
        created_at: None,
        passages: vec![IndexedPassage {
            text: "Hotel occupancy weakened during the quarter".to_string(),
            metadata: PassageMetadata::default(),
            embedding: vec![1.0, 0.0],
        }],
    };
    let model = PanickingModel;
    let embedder = matching_embedder();

    let reply = process_chat(
        "Visualize the hotel segment",
        &mut session,
        &index,
        &model,
        &embedder,
    )
    .await;

    assert!(reply.chart.is_none());
    assert!(reply.response.contains("No numerical data found"));
}

#[tokio::test]
async fn definition_answers_are_formatted() {
    let mut session = UserSession::new(true);
    let index = ReportIndex::default();
    let model = CannedModel {
        reply: "A villa is a standalone home. It typically includes private land.",
    };
    let mut embedder = MockEmbedder::new();
    embedder.expect_embed().times(0);

    let reply = process_chat("What is a villa?", &mut session, &index, &model, &embedder).await;

    assert!(reply.response.starts_with("## Definition"));
    assert!(reply.response.contains("\u{2022} A villa is a standalone home"));
}
