pub mod chart_service;
pub mod chat_service;
pub mod embedding_service;
pub mod llm_service;
pub mod retrieval_service;
