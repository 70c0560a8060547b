//! Conversation orchestration state machine.
//!
//! One inbound message flows through `START → {ContactAck,
//! SocialShortCircuit, Retrieve} → Respond → END`. Contact detection wins
//! over social detection, which wins over retrieval; the transitions live in
//! [`crate::classifier::classify`] so they can be tested in isolation.
//!
//! Invocations are independent: concurrent conversations run in parallel,
//! and the short-circuit delays are plain scheduling waits that never block
//! other conversations. Interleaved turns of the *same* conversation are not
//! serialized here; ordering is the history store's responsibility.

use crate::classifier::{classify, Intent};
use crate::responses::{append_contact_prompt, CONTACT_ACK, FALLBACK_RESPONSE};
use crate::store::{ConversationSink, HistoryStore};
use crate::types::{ChatOutcome, IncomingMessage};
use charla_core::text::{extract_keywords, normalize};
use charla_core::{AppConfig, AppError, AppResult};
use charla_llm::{LlmClient, LlmRequest};
use charla_prompt::{
    build_previous_answer_block, build_prompt, format_history, truncate_head, Role,
    COURSE_RESPONSE_GUIDELINES,
};
use charla_retrieval::{intent, ContextRetrievalEngine};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// The per-message decision flow over all collaborators.
pub struct ChatPipeline {
    config: AppConfig,
    llm: Arc<dyn LlmClient>,
    engine: ContextRetrievalEngine,
    history: Arc<dyn HistoryStore>,
    sink: Arc<dyn ConversationSink>,
}

impl ChatPipeline {
    /// Assemble a pipeline over its collaborators.
    pub fn new(
        config: AppConfig,
        llm: Arc<dyn LlmClient>,
        engine: ContextRetrievalEngine,
        history: Arc<dyn HistoryStore>,
        sink: Arc<dyn ConversationSink>,
    ) -> Self {
        Self {
            config,
            llm,
            engine,
            history,
            sink,
        }
    }

    /// Handle one inbound message and produce the reply.
    ///
    /// Fails on empty input (`Input`), on retrieval collaborator failures
    /// (`Embedding`/`Retrieval`), and on generation failures (`Generation`);
    /// in those cases nothing is persisted. Persistence failures after a
    /// successful answer are logged and swallowed.
    pub async fn handle(
        &self,
        message: &IncomingMessage,
        conversation_id: Option<String>,
    ) -> AppResult<ChatOutcome> {
        let user_message = message.text.trim();
        if user_message.is_empty() {
            return Err(AppError::Input("El mensaje no puede estar vacio.".to_string()));
        }

        let normalized_message = normalize(user_message);
        let course_intent = intent::is_course_request(&normalized_message);
        let conversation_id = conversation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let ip = message.ip.as_deref();

        tracing::info!(
            conversation_id = %conversation_id,
            question = %truncate_head(user_message, 100),
            "Chat message received"
        );

        match classify(user_message) {
            Intent::ContactShare => {
                tracing::info!(conversation_id = %conversation_id, "Contact info received");
                let response = append_contact_prompt(CONTACT_ACK);
                tokio::time::sleep(Duration::from_millis(self.config.contact_ack_delay_ms)).await;
                self.persist_exchange(&conversation_id, user_message, &response, ip)
                    .await;
                Ok(ChatOutcome {
                    response_text: response,
                    conversation_id,
                })
            }
            Intent::Social(reply) => {
                tracing::info!(conversation_id = %conversation_id, "Social short-circuit");
                tokio::time::sleep(Duration::from_millis(self.config.social_delay_ms)).await;
                let response = if reply.greeting {
                    reply.text.to_string()
                } else {
                    append_contact_prompt(reply.text)
                };
                self.persist_exchange(&conversation_id, user_message, &response, ip)
                    .await;
                Ok(ChatOutcome {
                    response_text: response,
                    conversation_id,
                })
            }
            Intent::InformationRequest => {
                let answer = self
                    .answer_with_retrieval(
                        &conversation_id,
                        user_message,
                        &normalized_message,
                        course_intent,
                    )
                    .await?;
                let final_answer = append_contact_prompt(&answer);
                self.persist_exchange(&conversation_id, user_message, &final_answer, ip)
                    .await;
                Ok(ChatOutcome {
                    response_text: final_answer,
                    conversation_id,
                })
            }
        }
    }

    /// Full retrieval + generation path.
    async fn answer_with_retrieval(
        &self,
        conversation_id: &str,
        user_message: &str,
        normalized_message: &str,
        course_intent: bool,
    ) -> AppResult<String> {
        let budgets = &self.config.budgets;

        // A failing history store degrades to an empty history
        let history = match self
            .history
            .recent_turns(conversation_id, budgets.max_history_turns)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(conversation_id, "Error loading history: {}", e);
                Vec::new()
            }
        };

        let (history_text, last_assistant_reply) =
            format_history(&history, budgets.max_history_turns, budgets.max_history_chars);
        let previous_answer_block = build_previous_answer_block(last_assistant_reply.as_deref())?;

        let keywords = extract_keywords(user_message);
        let retrieval = self
            .engine
            .retrieve(user_message, &keywords, normalized_message, course_intent)
            .await?;

        tracing::info!(
            conversation_id,
            filters = %retrieval.source_filters.join(","),
            retrieved = retrieval.counts.similar,
            used = retrieval.counts.used,
            keywords = retrieval.counts.keyword,
            best_similarity = retrieval.best_similarity,
            threshold = self.config.min_context_similarity,
            "Retrieval summary"
        );

        if retrieval.is_empty() {
            tracing::warn!(conversation_id, "No context available, skipping generation");
            return Ok(FALLBACK_RESPONSE.to_string());
        }

        let context = truncate_head(
            &retrieval.context_chunks.join("\n\n"),
            budgets.max_context_chars,
        );
        let prompt = build_prompt(
            &previous_answer_block,
            &history_text,
            &context,
            user_message,
            course_intent.then_some(COURSE_RESPONSE_GUIDELINES),
        )?;

        let request = LlmRequest::new(prompt, self.config.chat_model.clone())
            .with_temperature(self.config.temperature)
            .with_top_p(self.config.top_p);
        let response = self.llm.complete(&request).await?;

        if response.content.trim().is_empty() {
            return Err(AppError::Generation(
                "Model reply contained no usable text".to_string(),
            ));
        }

        Ok(response.content)
    }

    /// Persist both turns of a finished exchange.
    ///
    /// Failures are logged and discarded: the caller already holds the
    /// answer. A failed user-turn write skips the assistant turn so the
    /// store never holds a reply without its question.
    async fn persist_exchange(
        &self,
        conversation_id: &str,
        user_message: &str,
        answer: &str,
        ip: Option<&str>,
    ) {
        if let Err(e) = self
            .sink
            .save_turn(conversation_id, Role::User, user_message, ip)
            .await
        {
            tracing::error!(conversation_id, "Failed to save user turn: {}", e);
            return;
        }
        if let Err(e) = self
            .sink
            .save_turn(conversation_id, Role::Assistant, answer, ip)
            .await
        {
            tracing::error!(conversation_id, "Failed to save assistant turn: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::{CONTACT_PROMPT, REPLY_GRACIAS, REPLY_HOLA};
    use crate::store::MemoryConversationStore;
    use charla_core::AppResult;
    use charla_llm::{LlmResponse, LlmUsage};
    use charla_prompt::ConversationTurn;
    use charla_retrieval::{
        EmbeddingEngine, EmbeddingProvider, EvidenceChunk, KnowledgeStore, RetrievalConfig,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Uniform embedding provider: every text maps to the same unit vector.
    #[derive(Debug)]
    struct UniformProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for UniformProvider {
        fn provider_name(&self) -> &str {
            "uniform"
        }

        fn model_name(&self) -> &str {
            "uniform-v1"
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    /// Store with scripted similarity results, counting search calls.
    #[derive(Default)]
    struct CountingStore {
        similar: Vec<EvidenceChunk>,
        search_calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl KnowledgeStore for CountingStore {
        async fn search_similar(
            &self,
            _query: &[f32],
            top_k: usize,
            _source_prefixes: &[String],
        ) -> AppResult<Vec<EvidenceChunk>> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.similar.iter().take(top_k).cloned().collect())
        }

        async fn find_by_keywords(
            &self,
            _keywords: &[String],
            _max_results: usize,
        ) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn get_by_paths(&self, _paths: &[String]) -> AppResult<Vec<EvidenceChunk>> {
            Ok(Vec::new())
        }
    }

    /// Generation fake recording every prompt it receives.
    struct FakeLlm {
        reply: String,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeLlm {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for FakeLlm {
        fn provider_name(&self) -> &str {
            "fake"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt.clone());
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
                done: true,
            })
        }
    }

    /// Sink that always fails, for persistence-swallowing tests.
    struct FailingSink;

    #[async_trait::async_trait]
    impl ConversationSink for FailingSink {
        async fn save_turn(
            &self,
            _conversation_id: &str,
            _role: Role,
            _content: &str,
            _ip: Option<&str>,
        ) -> AppResult<()> {
            Err(AppError::Persistence("disk full".to_string()))
        }
    }

    struct Harness {
        pipeline: ChatPipeline,
        store: Arc<CountingStore>,
        llm: Arc<FakeLlm>,
        memory: Arc<MemoryConversationStore>,
    }

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.contact_ack_delay_ms = 0;
        config.social_delay_ms = 0;
        config
    }

    fn harness_with(similar: Vec<EvidenceChunk>, llm_reply: &str) -> Harness {
        let store = Arc::new(CountingStore {
            similar,
            search_calls: AtomicUsize::new(0),
        });
        let llm = FakeLlm::replying(llm_reply);
        let memory = Arc::new(MemoryConversationStore::new());

        let engine = ContextRetrievalEngine::new(
            EmbeddingEngine::new(Arc::new(UniformProvider), 16),
            store.clone(),
            RetrievalConfig::default(),
        );
        let pipeline = ChatPipeline::new(
            test_config(),
            llm.clone(),
            engine,
            memory.clone(),
            memory.clone(),
        );

        Harness {
            pipeline,
            store,
            llm,
            memory,
        }
    }

    fn chunk(text: &str, source: &str, similarity: f32) -> EvidenceChunk {
        EvidenceChunk {
            text: text.to_string(),
            source: source.to_string(),
            similarity,
        }
    }

    #[tokio::test]
    async fn test_empty_message_rejected_without_side_effects() {
        let h = harness_with(vec![], "respuesta");

        let result = h
            .pipeline
            .handle(&IncomingMessage::new("   "), Some("c1".to_string()))
            .await;

        assert!(matches!(result, Err(AppError::Input(_))));
        assert!(h.memory.turns_for("c1").is_empty());
        assert_eq!(h.store.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_greeting_short_circuits_without_retrieval_or_suffix() {
        let h = harness_with(vec![], "respuesta");

        let outcome = h
            .pipeline
            .handle(&IncomingMessage::new("Hola"), Some("c1".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome.response_text, REPLY_HOLA);
        assert!(!outcome.response_text.contains(CONTACT_PROMPT));
        assert_eq!(h.store.search_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.llm.calls.load(Ordering::SeqCst), 0);
        // both turns persisted
        assert_eq!(h.memory.turns_for("c1").len(), 2);
    }

    #[tokio::test]
    async fn test_thanks_reply_gets_contact_suffix() {
        let h = harness_with(vec![], "respuesta");

        let outcome = h
            .pipeline
            .handle(&IncomingMessage::new("Gracias!!"), Some("c1".to_string()))
            .await
            .unwrap();

        assert!(outcome.response_text.starts_with(REPLY_GRACIAS));
        assert!(outcome.response_text.ends_with(CONTACT_PROMPT));
        assert_eq!(h.store.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_contact_path_wins_over_course_keywords() {
        let h = harness_with(vec![], "respuesta");

        let outcome = h
            .pipeline
            .handle(
                &IncomingMessage::new("quiero el curso de instalaciones, mi correo es x@y.com"),
                Some("c1".to_string()),
            )
            .await
            .unwrap();

        assert!(outcome.response_text.starts_with(CONTACT_ACK));
        assert!(outcome.response_text.ends_with(CONTACT_PROMPT));
        assert_eq!(h.store.search_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_retrieval_path_generates_and_appends_suffix() {
        let h = harness_with(
            vec![chunk("Ofrecemos calculo estructural.", "servicios/calculo.md", 0.9)],
            "Hacemos calculo estructural",
        );

        let outcome = h
            .pipeline
            .handle(
                &IncomingMessage::new("que servicios de calculo ofrecen?"),
                Some("c1".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(h.llm.calls.load(Ordering::SeqCst), 1);
        assert!(outcome.response_text.starts_with("Hacemos calculo estructural"));
        assert!(outcome.response_text.ends_with(CONTACT_PROMPT));

        let prompt = h.llm.last_prompt();
        assert!(prompt.contains("CONTEXTO:\nOfrecemos calculo estructural."));
        assert!(prompt.contains("NUEVA PREGUNTA DEL USUARIO:"));
        assert!(prompt.ends_with("RESPUESTA:"));

        let turns = h.memory.turns_for("c1");
        assert_eq!(turns.len(), 2);
        assert!(turns[1].content.ends_with(CONTACT_PROMPT));
    }

    #[tokio::test]
    async fn test_course_question_injects_guideline() {
        let h = harness_with(
            vec![chunk("Curso de instalaciones electricas.", "cursos/instalaciones.md", 0.9)],
            "Tenemos cursos",
        );

        h.pipeline
            .handle(
                &IncomingMessage::new("que cursos ofrecen?"),
                Some("c1".to_string()),
            )
            .await
            .unwrap();

        let prompt = h.llm.last_prompt();
        assert!(prompt.contains("9 cursos en total"));
    }

    #[tokio::test]
    async fn test_empty_context_uses_fallback_without_generation() {
        let h = harness_with(vec![chunk("lejano", "otros/x.md", 0.4)], "respuesta");

        let outcome = h
            .pipeline
            .handle(
                &IncomingMessage::new("que servicios ofrecen?"),
                Some("c1".to_string()),
            )
            .await
            .unwrap();

        assert!(outcome.response_text.starts_with(FALLBACK_RESPONSE));
        assert_eq!(h.llm.calls.load(Ordering::SeqCst), 0);
        // the exchange is still persisted
        assert_eq!(h.memory.turns_for("c1").len(), 2);
    }

    #[tokio::test]
    async fn test_empty_generation_is_an_error_and_nothing_persisted() {
        let h = harness_with(
            vec![chunk("Ofrecemos calculo.", "servicios/calculo.md", 0.9)],
            "   ",
        );

        let result = h
            .pipeline
            .handle(
                &IncomingMessage::new("que servicios ofrecen?"),
                Some("c1".to_string()),
            )
            .await;

        assert!(matches!(result, Err(AppError::Generation(_))));
        assert!(h.memory.turns_for("c1").is_empty());
    }

    #[tokio::test]
    async fn test_suffix_not_duplicated_when_model_already_included_it() {
        let reply = format!("Ya lo dije. {}", CONTACT_PROMPT);
        let h = harness_with(
            vec![chunk("Ofrecemos calculo.", "servicios/calculo.md", 0.9)],
            &reply,
        );

        let outcome = h
            .pipeline
            .handle(
                &IncomingMessage::new("que servicios ofrecen?"),
                Some("c1".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome.response_text.matches(CONTACT_PROMPT).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_fresh_conversation_id_generated() {
        let h = harness_with(vec![], "respuesta");

        let outcome = h
            .pipeline
            .handle(&IncomingMessage::new("Hola"), None)
            .await
            .unwrap();

        assert!(!outcome.conversation_id.is_empty());
        assert_eq!(h.memory.turns_for(&outcome.conversation_id).len(), 2);
    }

    #[tokio::test]
    async fn test_previous_answer_block_included_on_follow_up() {
        let h = harness_with(
            vec![chunk("Ofrecemos calculo.", "servicios/calculo.md", 0.9)],
            "Respuesta nueva",
        );
        h.memory
            .save_turn("c1", Role::User, "que servicios ofrecen?", None)
            .await
            .unwrap();
        h.memory
            .save_turn("c1", Role::Assistant, "Respuesta vieja", None)
            .await
            .unwrap();

        h.pipeline
            .handle(
                &IncomingMessage::new("no entendi, que servicios ofrecen?"),
                Some("c1".to_string()),
            )
            .await
            .unwrap();

        let prompt = h.llm.last_prompt();
        assert!(prompt.contains("Tu respuesta anterior fue:"));
        assert!(prompt.contains("Respuesta vieja"));
        assert!(prompt.contains("Usuario: que servicios ofrecen?"));
    }

    #[tokio::test]
    async fn test_persistence_failure_is_swallowed() {
        let store = Arc::new(CountingStore::default());
        let llm = FakeLlm::replying("respuesta");
        let memory = Arc::new(MemoryConversationStore::new());
        let engine = ContextRetrievalEngine::new(
            EmbeddingEngine::new(Arc::new(UniformProvider), 16),
            store,
            RetrievalConfig::default(),
        );
        let pipeline = ChatPipeline::new(
            test_config(),
            llm,
            engine,
            memory,
            Arc::new(FailingSink),
        );

        let outcome = pipeline
            .handle(&IncomingMessage::new("Hola"), Some("c1".to_string()))
            .await;

        assert!(outcome.is_ok());
    }
}
