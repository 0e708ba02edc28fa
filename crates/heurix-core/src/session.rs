//! Lazily created, reusable model session.

use std::sync::Arc;

use heurix_protocols::{ModelError, ModelPromptService, ModelSession, PromptStream, SessionParams};
use tracing::{debug, info};

/// Owns at most one live model session.
///
/// The session is created on first prompt and reused until [`reset`](Self::reset)
/// destroys it; the next prompt then creates a fresh one.
pub struct AnalysisSession {
    service: Arc<dyn ModelPromptService>,
    params: SessionParams,
    active: Option<Box<dyn ModelSession>>,
}

impl AnalysisSession {
    pub fn new(service: Arc<dyn ModelPromptService>, params: SessionParams) -> Self {
        Self {
            service,
            params,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Prompt the current session, creating it first if needed.
    pub async fn prompt(
        &mut self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<PromptStream, ModelError> {
        let session = match &mut self.active {
            Some(session) => session,
            slot => {
                info!("Creating model session via '{}'", self.service.id());
                slot.insert(self.service.create_session(&self.params).await?)
            }
        };
        session.prompt_stream(prompt, schema).await
    }

    /// Destroy the current session, if any.
    pub fn reset(&mut self) {
        if let Some(mut session) = self.active.take() {
            debug!("Destroying model session");
            session.destroy();
        }
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use heurix_protocols::PromptChunk;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        created: AtomicUsize,
        destroyed: AtomicUsize,
    }

    struct EchoService {
        counters: Arc<Counters>,
        fail_creation: bool,
    }

    struct EchoSession {
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl ModelPromptService for EchoService {
        fn id(&self) -> &str {
            "echo"
        }

        async fn create_session(
            &self,
            _params: &SessionParams,
        ) -> Result<Box<dyn ModelSession>, ModelError> {
            if self.fail_creation {
                return Err(ModelError::SessionCreation("no model".to_string()));
            }
            self.counters.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(EchoSession {
                counters: self.counters.clone(),
            }))
        }
    }

    #[async_trait]
    impl ModelSession for EchoSession {
        async fn prompt_stream(
            &mut self,
            prompt: &str,
            _schema: &serde_json::Value,
        ) -> Result<PromptStream, ModelError> {
            let chunks = vec![Ok(PromptChunk::delta(prompt.to_string()))];
            Ok(Box::pin(futures::stream::iter(chunks)))
        }

        fn destroy(&mut self) {
            self.counters.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session(counters: &Arc<Counters>, fail_creation: bool) -> AnalysisSession {
        let service = Arc::new(EchoService {
            counters: counters.clone(),
            fail_creation,
        });
        AnalysisSession::new(service, SessionParams::new("system"))
    }

    #[tokio::test]
    async fn test_session_created_once_and_reused() {
        let counters = Arc::new(Counters::default());
        let mut session = session(&counters, false);
        assert!(!session.is_active());

        for prompt in ["a", "b"] {
            let mut stream = session.prompt(prompt, &serde_json::json!({})).await.unwrap();
            assert_eq!(stream.next().await.unwrap().unwrap(), PromptChunk::delta(prompt));
        }

        assert!(session.is_active());
        assert_eq!(counters.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_destroys_and_recreates() {
        let counters = Arc::new(Counters::default());
        let mut session = session(&counters, false);

        session.prompt("a", &serde_json::json!({})).await.unwrap();
        session.reset();
        assert!(!session.is_active());
        assert_eq!(counters.destroyed.load(Ordering::SeqCst), 1);

        session.prompt("b", &serde_json::json!({})).await.unwrap();
        assert_eq!(counters.created.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_creation_failure_leaves_no_session() {
        let counters = Arc::new(Counters::default());
        let mut session = session(&counters, true);

        let result = session.prompt("a", &serde_json::json!({})).await;
        assert!(matches!(result, Err(ModelError::SessionCreation(_))));
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn test_drop_destroys_session() {
        let counters = Arc::new(Counters::default());
        {
            let mut session = session(&counters, false);
            session.prompt("a", &serde_json::json!({})).await.unwrap();
        }
        assert_eq!(counters.destroyed.load(Ordering::SeqCst), 1);
    }
}
