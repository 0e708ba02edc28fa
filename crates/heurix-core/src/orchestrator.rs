//! Analysis run orchestration.

use std::sync::Arc;

use futures::StreamExt;
use heurix_cache::{CacheStore, InsightsPayload};
use heurix_config::AnalysisConfig;
use heurix_protocols::{
    AnalysisError, AnalysisResult, ModelPromptService, ModelResponse, PageContextProvider,
    PromptChunk, RenderSink, SessionParams,
};
use heurix_stream::{StreamReconciler, StreamingJsonExtractor};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::context::CanonicalContext;
use crate::finalize::{parse_final, ParsedAnalysis};
use crate::history::AnalysisHistory;
use crate::prompt::{build_prompt, response_schema};
use crate::session::AnalysisSession;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    CacheCheck,
    ModelCall,
    Streaming,
    Finalizing,
    Error,
}

/// How a run was requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip the insights cache and always prompt the model.
    pub force_reanalysis: bool,
    /// Keep the previous score for unchanged content ("analyze again").
    pub preserve_score: bool,
}

impl RunOptions {
    pub fn forced() -> Self {
        Self {
            force_reanalysis: true,
            preserve_score: false,
        }
    }

    pub fn again() -> Self {
        Self {
            force_reanalysis: true,
            preserve_score: true,
        }
    }
}

/// A completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub result: AnalysisResult,
    pub from_cache: bool,
    pub cache_key: String,
    pub signature: String,
}

#[derive(Debug, Clone)]
struct LastRun {
    cache_key: String,
    signature: String,
    score: Option<f64>,
}

/// Drives analysis runs, one at a time.
pub struct AnalysisOrchestrator {
    session: AnalysisSession,
    caches: Arc<CacheStore>,
    pages: Arc<dyn PageContextProvider>,
    sink: Arc<dyn RenderSink>,
    config: AnalysisConfig,
    history: AnalysisHistory,
    state: RunState,
    last_run: Option<LastRun>,
}

impl AnalysisOrchestrator {
    pub fn new(
        service: Arc<dyn ModelPromptService>,
        params: SessionParams,
        caches: Arc<CacheStore>,
        pages: Arc<dyn PageContextProvider>,
        sink: Arc<dyn RenderSink>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            session: AnalysisSession::new(service, params),
            caches,
            pages,
            sink,
            history: AnalysisHistory::new(config.history_capacity),
            config,
            state: RunState::Idle,
            last_run: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn history(&self) -> &AnalysisHistory {
        &self.history
    }

    pub fn caches(&self) -> &Arc<CacheStore> {
        &self.caches
    }

    pub fn has_session(&self) -> bool {
        self.session.is_active()
    }

    /// Run one analysis of the current page.
    ///
    /// Failures are rendered through the sink and returned; caches are never
    /// written by a failed run.
    pub async fn analyze(&mut self, options: RunOptions) -> Result<RunOutcome, AnalysisError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", %run_id);

        let outcome = self.run(options).instrument(span.clone()).await;
        let _entered = span.enter();
        match outcome {
            Ok(outcome) => {
                self.state = RunState::Idle;
                Ok(outcome)
            }
            Err(e) => {
                self.transition(RunState::Error);
                warn!("Analysis failed: {}", e);
                if e.resets_session() {
                    self.session.reset();
                }
                self.sink.render_failure(&e);
                self.sink.render_reset();
                self.transition(RunState::Idle);
                Err(e)
            }
        }
    }

    /// Destroy the model session and write pending cache snapshots.
    pub async fn shutdown(&mut self) {
        self.session.reset();
        self.caches.flush().await;
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn run(&mut self, options: RunOptions) -> Result<RunOutcome, AnalysisError> {
        self.transition(RunState::CacheCheck);
        self.caches.ensure_loaded().await;

        let page = self.pages.page_context().await?;
        let context = CanonicalContext::from_page(&page)?;
        debug!(
            "Context for '{}' signed {}",
            context.cache_key, context.signature
        );

        if options.force_reanalysis || options.preserve_score {
            self.drop_stale_score(&context);
        } else if let Some(outcome) = self.cached_outcome(&context) {
            self.remember(&outcome);
            return Ok(outcome);
        }

        let locked_score = if options.preserve_score {
            self.locked_score(&context)
        } else {
            None
        };

        self.transition(RunState::ModelCall);
        let sink = self.sink.clone();
        let mut reconciler = match locked_score {
            Some(score) => StreamReconciler::with_score_lock(score),
            None => StreamReconciler::new(),
        };
        reconciler.begin(sink.as_ref());

        let mut stream = self
            .session
            .prompt(&build_prompt(&context), &response_schema())
            .await?;

        self.transition(RunState::Streaming);
        let mut extractor = StreamingJsonExtractor::new();
        let mut response = None;
        while let Some(chunk) = stream.next().await {
            match chunk? {
                PromptChunk::Delta(delta) => {
                    let snapshot = extractor.push(&delta);
                    reconciler.reconcile(&snapshot, sink.as_ref());
                }
                PromptChunk::Done(done) => {
                    response = Some(done);
                    break;
                }
            }
        }
        drop(stream);

        self.transition(RunState::Finalizing);
        let max_chars = self.config.max_field_chars;
        let parsed = match response {
            Some(ModelResponse::Structured(result)) => ParsedAnalysis::from_result(result, max_chars),
            Some(ModelResponse::Text(text)) if !text.trim().is_empty() => parse_final(&text, max_chars)?,
            _ => parse_final(extractor.buffer(), max_chars)?,
        };

        let outcome = self.finalize(&context, parsed, reconciler.locked_score());
        self.remember(&outcome);
        Ok(outcome)
    }

    /// A hit needs fresh insights for the current signature. The score is
    /// served only when its entry is trusted for the same content.
    fn cached_outcome(&self, context: &CanonicalContext) -> Option<RunOutcome> {
        let insights = self.caches.insights().get(&context.cache_key)?;
        if insights.signature != context.signature {
            debug!("Cached insights for '{}' belong to other content", context.cache_key);
            return None;
        }
        let usability_score = self
            .caches
            .scores()
            .get(&context.cache_key)
            .filter(|entry| entry.matches(Some(&context.signature)))
            .map(|entry| entry.score);

        let result = AnalysisResult {
            usability_score,
            strengths: insights.strengths,
            issues: insights.issues,
            summary: insights.summary,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        info!("Serving cached analysis for '{}'", context.cache_key);
        self.sink.render_final(&result, true);

        Some(RunOutcome {
            result,
            from_cache: true,
            cache_key: context.cache_key.clone(),
            signature: context.signature.clone(),
        })
    }

    /// A re-requested analysis of changed content must not inherit the old score.
    fn drop_stale_score(&self, context: &CanonicalContext) {
        let stale = self
            .caches
            .scores()
            .get(&context.cache_key)
            .is_some_and(|entry| !entry.matches(Some(&context.signature)));
        if stale {
            info!("Content of '{}' changed; discarding its score", context.cache_key);
            self.caches.scores().delete(&context.cache_key);
        }
    }

    /// The previous score, if the previous run saw the same content.
    fn locked_score(&self, context: &CanonicalContext) -> Option<f64> {
        let last = self.last_run.as_ref()?;
        if last.cache_key != context.cache_key || last.signature != context.signature {
            debug!("Content changed since the last run; score not locked");
            return None;
        }
        let score = last.score?;
        info!("Locking score at {}", score);
        Some(score)
    }

    fn finalize(
        &mut self,
        context: &CanonicalContext,
        parsed: ParsedAnalysis,
        locked_score: Option<f64>,
    ) -> RunOutcome {
        let candidate = locked_score.or(parsed.usability_score);
        let score = candidate.and_then(|candidate| {
            self.caches
                .scores()
                .resolve_or_store(&context.cache_key, candidate, Some(&context.signature))
        });

        self.caches.insights().store(
            &context.cache_key,
            InsightsPayload {
                strengths: parsed.strengths.clone(),
                issues: parsed.issues.clone(),
                summary: parsed.summary.clone(),
                signature: context.signature.clone(),
            },
        );

        let result = parsed.into_result(score, chrono::Utc::now().timestamp_millis());
        self.history.push(result.clone());
        self.sink.render_final(&result, false);
        info!(
            "Analysis of '{}' complete: score {:?}, {} issues",
            context.cache_key,
            result.display_score(),
            result.issues.len()
        );

        RunOutcome {
            result,
            from_cache: false,
            cache_key: context.cache_key.clone(),
            signature: context.signature.clone(),
        }
    }

    fn remember(&mut self, outcome: &RunOutcome) {
        self.last_run = Some(LastRun {
            cache_key: outcome.cache_key.clone(),
            signature: outcome.signature.clone(),
            score: outcome.result.usability_score,
        });
    }
}
