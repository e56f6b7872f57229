//! The question-answering service.
//!
//! `ChatService` has a two-phase lifecycle: it is constructed uninitialized
//! and answers questions only after [`ChatService::initialize`] has populated
//! (or verified) the index. Pipeline failures never escape as panics or raw
//! errors; they become [`AnswerError`] values whose `user_message()` renders
//! the Spanish-language strings clients see.

use super::context::{format_context, ContextBuilder};
use crate::config::{Prompts, Settings};
use crate::error::{CronistaError, Result};
use crate::indexer::{IndexReport, Indexer};
use crate::llm::{OllamaGenerator, TextGenerator};
use crate::vector_store::VectorStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument};

/// Answer returned when the model generates only whitespace.
const NO_ANSWER_WARNING: &str = "⚠️ No se pudo obtener una respuesta válida.";

/// Why a question could not be answered.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// The question was empty or whitespace-only.
    #[error("empty question")]
    EmptyQuestion,

    /// `initialize()` has not completed yet.
    #[error("index not initialized")]
    Uninitialized,

    /// Embedding the question or searching the store failed.
    #[error("retrieval failed: {0}")]
    Retrieval(#[source] CronistaError),

    /// The language model call failed.
    #[error("generation failed: {0}")]
    Generation(#[source] CronistaError),
}

impl AnswerError {
    /// The Spanish-language warning shown to clients. Errors never reach
    /// users in any other form.
    pub fn user_message(&self) -> String {
        match self {
            AnswerError::EmptyQuestion => "⚠️ La pregunta no puede estar vacía.".to_string(),
            AnswerError::Uninitialized => {
                "⚠️ El índice no está inicializado. Reinicia el servidor e inténtalo de nuevo."
                    .to_string()
            }
            AnswerError::Retrieval(e) | AnswerError::Generation(e) => {
                format!("⚠️ Ocurrió un error al procesar la pregunta: {}", e)
            }
        }
    }
}

/// Answers questions about the indexed sources.
pub struct ChatService {
    indexer: Indexer,
    context: ContextBuilder,
    generator: Arc<dyn TextGenerator>,
    template: String,
    initialized: AtomicBool,
}

impl ChatService {
    /// Create a service wired from configuration.
    ///
    /// The service starts uninitialized; call [`ChatService::initialize`]
    /// before answering questions.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
        let generator: Arc<dyn TextGenerator> =
            Arc::new(OllamaGenerator::new(&settings.ollama, &settings.llm)?);
        let indexer = Indexer::new(settings)?;

        Ok(Self::new(indexer, generator, prompts))
    }

    /// Create a service over custom components.
    pub fn new(indexer: Indexer, generator: Arc<dyn TextGenerator>, prompts: Prompts) -> Self {
        let context = ContextBuilder::new(indexer.vector_store(), indexer.embedder())
            .with_top_k(indexer.settings().rag.top_k);

        Self {
            indexer,
            context,
            generator,
            template: prompts.qa.template,
            initialized: AtomicBool::new(false),
        }
    }

    /// Populate the index if it is empty and mark the service ready.
    pub async fn initialize(&self) -> Result<IndexReport> {
        let report = self.indexer.ensure_indexed().await?;
        self.initialized.store(true, Ordering::SeqCst);
        info!("Chat service ready");
        Ok(report)
    }

    /// Whether [`ChatService::initialize`] has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// The vector store behind the service.
    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.indexer.vector_store()
    }

    /// Answer a question from the indexed sources.
    ///
    /// The question is validated before the readiness state, so an empty
    /// question gets the same error whether or not the service is ready.
    /// Pipeline failures are logged here and surfaced as typed errors.
    #[instrument(skip(self, question))]
    pub async fn answer(&self, question: &str) -> std::result::Result<String, AnswerError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AnswerError::EmptyQuestion);
        }
        if !self.is_initialized() {
            return Err(AnswerError::Uninitialized);
        }

        let fragments = self.context.build(question).await.map_err(|e| {
            error!("Retrieval failed for question {:?}: {}", question, e);
            AnswerError::Retrieval(e)
        })?;

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), format_context(&fragments));
        vars.insert("question".to_string(), question.to_string());
        let prompt = Prompts::render(&self.template, &vars);

        let generated = self.generator.generate(&prompt).await.map_err(|e| {
            error!("Generation failed for question {:?}: {}", question, e);
            AnswerError::Generation(e)
        })?;

        let answer = generated.trim();
        if answer.is_empty() {
            return Ok(NO_ANSWER_WARNING.to_string());
        }

        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::scrape::PageFetcher;
    use crate::vector_store::{Fragment, MemoryVectorStore};
    use async_trait::async_trait;

    struct NoFetcher;

    #[async_trait]
    impl PageFetcher for NoFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            Err(CronistaError::Fetch(format!("Connection refused: {}", url)))
        }
    }

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(CronistaError::Embedding("sin conexión con Ollama".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(CronistaError::Embedding("sin conexión con Ollama".to_string()))
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Returns the rendered prompt verbatim.
    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    struct BlankGenerator;

    #[async_trait]
    impl TextGenerator for BlankGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok("   \n".to_string())
        }

        fn model(&self) -> &str {
            "blank"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(CronistaError::Generation("el modelo no responde".to_string()))
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    /// Store holding four fragments with descending similarity to the stub
    /// query embedding [1.0, 0.0]: X > Y > Z > W.
    async fn populated_store() -> Arc<MemoryVectorStore> {
        let store = MemoryVectorStore::new();
        let rows = [
            ("https://example.com/x", "fragmento X", vec![1.0, 0.0]),
            ("https://example.com/y", "fragmento Y", vec![0.9, 0.1]),
            ("https://example.com/z", "fragmento Z", vec![0.7, 0.3]),
            ("https://example.com/w", "fragmento W", vec![0.0, 1.0]),
        ];
        let fragments: Vec<Fragment> = rows
            .into_iter()
            .enumerate()
            .map(|(i, (url, content, embedding))| {
                Fragment::new(url.to_string(), i as i32, content.to_string(), embedding)
            })
            .collect();
        store.insert_batch(&fragments).await.unwrap();
        Arc::new(store)
    }

    fn service_over(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
    ) -> ChatService {
        let indexer =
            Indexer::with_components(Settings::default(), Arc::new(NoFetcher), embedder, store)
                .unwrap();
        ChatService::new(indexer, generator, Prompts::default())
    }

    #[tokio::test]
    async fn test_empty_question_rejected_regardless_of_state() {
        let service = service_over(
            populated_store().await,
            Arc::new(StubEmbedder),
            Arc::new(EchoGenerator),
        );

        let err = service.answer("").await.unwrap_err();
        assert!(matches!(err, AnswerError::EmptyQuestion));
        assert_eq!(err.user_message(), "⚠️ La pregunta no puede estar vacía.");

        assert!(matches!(
            service.answer("   ").await.unwrap_err(),
            AnswerError::EmptyQuestion
        ));

        service.initialize().await.unwrap();
        assert!(matches!(
            service.answer(" \n\t ").await.unwrap_err(),
            AnswerError::EmptyQuestion
        ));
    }

    #[tokio::test]
    async fn test_answer_before_initialize_is_rejected() {
        let service = service_over(
            populated_store().await,
            Arc::new(StubEmbedder),
            Arc::new(EchoGenerator),
        );

        assert!(!service.is_initialized());
        let err = service.answer("¿Qué pasó?").await.unwrap_err();
        assert!(matches!(err, AnswerError::Uninitialized));
        assert_eq!(
            err.user_message(),
            "⚠️ El índice no está inicializado. Reinicia el servidor e inténtalo de nuevo."
        );
    }

    #[tokio::test]
    async fn test_answer_uses_top_three_fragments() {
        let service = service_over(
            populated_store().await,
            Arc::new(StubEmbedder),
            Arc::new(EchoGenerator),
        );
        service.initialize().await.unwrap();

        // The echo generator returns the rendered prompt, so the answer
        // exposes exactly which fragments became context.
        let answer = service.answer("¿Qué pasó?").await.unwrap();
        assert!(answer.contains("fragmento X\n\nfragmento Y\n\nfragmento Z"));
        assert!(!answer.contains("fragmento W"));
        assert!(answer.contains("¿Qué pasó?"));
        assert!(answer.contains("historiador"));
    }

    #[tokio::test]
    async fn test_blank_generation_yields_fixed_warning() {
        let service = service_over(
            populated_store().await,
            Arc::new(StubEmbedder),
            Arc::new(BlankGenerator),
        );
        service.initialize().await.unwrap();

        let answer = service.answer("¿Qué pasó?").await.unwrap();
        assert_eq!(answer, "⚠️ No se pudo obtener una respuesta válida.");
    }

    #[tokio::test]
    async fn test_retrieval_failure_becomes_typed_error() {
        let service = service_over(
            populated_store().await,
            Arc::new(FailingEmbedder),
            Arc::new(EchoGenerator),
        );
        service.initialize().await.unwrap();

        let err = service.answer("¿Qué pasó?").await.unwrap_err();
        assert!(matches!(err, AnswerError::Retrieval(_)));
        let message = err.user_message();
        assert!(message.starts_with("⚠️ Ocurrió un error al procesar la pregunta:"));
        assert!(message.contains("sin conexión con Ollama"));
    }

    #[tokio::test]
    async fn test_generation_failure_becomes_typed_error() {
        let service = service_over(
            populated_store().await,
            Arc::new(StubEmbedder),
            Arc::new(FailingGenerator),
        );
        service.initialize().await.unwrap();

        let err = service.answer("¿Qué pasó?").await.unwrap_err();
        assert!(matches!(err, AnswerError::Generation(_)));
        assert!(err.user_message().contains("el modelo no responde"));
    }

    #[tokio::test]
    async fn test_initialize_with_no_reachable_sources_still_ready() {
        let service = service_over(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(StubEmbedder),
            Arc::new(EchoGenerator),
        );

        // Every configured source fails to fetch; the run completes with an
        // empty index and the service still becomes ready.
        let report = service.initialize().await.unwrap();
        assert!(!report.skipped);
        assert_eq!(report.fragments_written, 0);
        assert!(service.is_initialized());

        let answer = service.answer("¿Qué pasó?").await.unwrap();
        assert!(answer.contains("Contexto:"));
    }

    #[tokio::test]
    async fn test_initialize_skips_populated_store() {
        let store = populated_store().await;
        let service = service_over(
            store.clone(),
            Arc::new(StubEmbedder),
            Arc::new(EchoGenerator),
        );

        let report = service.initialize().await.unwrap();
        assert!(report.skipped);
        assert_eq!(service.vector_store().count().await.unwrap(), 4);
    }
}
