//! Evaluation session
//!
//! Couples one [`LazyState`] with a model. Each operation issues at most one
//! model request and waits for it; a failed operation leaves the session as
//! it was. A session is not meant to be shared: callers that need it from
//! several tasks must wrap it in their own mutex.

mod prompt;
#[cfg(test)]
mod proptests;

pub use prompt::{is_done_sentinel, DONE_SENTINEL, LAZY_SYSTEM_PROMPT};

use crate::llm::{LlmError, LlmRequest, LlmService, DEFAULT_MAX_TOKENS};
use crate::state::{LazyState, StateError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("problem is not initialized, call initialize_problem first")]
    NotInitialized,
    #[error("model returned no next step")]
    EmptyResponse,
    #[error(transparent)]
    Transport(#[from] LlmError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to serialize question history: {0}")]
    History(#[from] serde_json::Error),
}

/// What happens to the question history when a new problem is initialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryPolicy {
    /// Keep earlier questions and answers; they stay visible to later questions
    #[default]
    Preserve,
    /// Start every problem with an empty history
    ClearOnInitialize,
}

/// Result of [`EvaluationSession::advance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A new step, already appended to the state
    Step(String),
    /// The model reported the problem solved
    Done,
}

pub struct EvaluationSession {
    llm: Arc<dyn LlmService>,
    max_tokens: u32,
    system_prompt: String,
    history_policy: HistoryPolicy,
    state: Option<LazyState>,
    /// Alternating question, answer entries
    question_history: Vec<String>,
    complete: bool,
}

impl EvaluationSession {
    /// Session with no problem yet
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self {
            llm,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: LAZY_SYSTEM_PROMPT.to_string(),
            history_policy: HistoryPolicy::default(),
            state: None,
            question_history: Vec::new(),
            complete: false,
        }
    }

    /// Session already initialized with `problem`
    pub fn for_problem(llm: Arc<dyn LlmService>, problem: impl Into<String>) -> Self {
        let mut session = Self::new(llm);
        session.state = Some(LazyState::new(problem));
        session
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    #[must_use]
    pub fn with_history_policy(mut self, policy: HistoryPolicy) -> Self {
        self.history_policy = policy;
        self
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn state(&self) -> Option<&LazyState> {
        self.state.as_ref()
    }

    pub fn question_history(&self) -> &[String] {
        &self.question_history
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Whether [`advance`](Self::advance) has seen the completion sentinel
    /// since the last initialize or refresh
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Replace the state with a fresh one for `problem`.
    ///
    /// Question history survives unless the policy is
    /// [`HistoryPolicy::ClearOnInitialize`].
    pub fn initialize_problem(&mut self, problem: impl Into<String>) {
        self.state = Some(LazyState::new(problem));
        self.complete = false;
        if self.history_policy == HistoryPolicy::ClearOnInitialize {
            self.question_history.clear();
        }
        tracing::debug!(history_len = self.question_history.len(), "Problem initialized");
    }

    /// # Errors
    ///
    /// `NotInitialized` before a problem is set.
    pub fn current_step(&self) -> Result<&str, SessionError> {
        Ok(self.state_ref()?.current_step()?)
    }

    /// Reset the steps back to the bare problem.
    ///
    /// # Errors
    ///
    /// `NotInitialized` before a problem is set.
    pub fn refresh_state(&mut self) -> Result<(), SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NotInitialized)?;
        state.refresh();
        self.complete = false;
        Ok(())
    }

    /// Ask the model for the next step and append it.
    ///
    /// Returns the trimmed step text. The completion sentinel is returned and
    /// appended like any other step; see [`advance`](Self::advance) for a
    /// variant that recognizes it.
    ///
    /// # Errors
    ///
    /// `NotInitialized` before a problem is set, `EmptyResponse` when the
    /// model returns only whitespace, `Transport` for any model failure. The
    /// state is unchanged on error.
    pub async fn get_next_step(&mut self) -> Result<String, SessionError> {
        let step = self.request_next_step().await?;
        self.push_step(step.clone())?;
        Ok(step)
    }

    /// Like [`get_next_step`](Self::get_next_step), but maps the completion
    /// sentinel to [`StepOutcome::Done`] instead of appending it.
    ///
    /// Once done, further calls return `Done` without contacting the model
    /// until the state is refreshed or a new problem is initialized.
    ///
    /// # Errors
    ///
    /// Same as [`get_next_step`](Self::get_next_step).
    pub async fn advance(&mut self) -> Result<StepOutcome, SessionError> {
        self.state_ref()?;
        if self.complete {
            return Ok(StepOutcome::Done);
        }

        let step = self.request_next_step().await?;
        if is_done_sentinel(&step) {
            tracing::info!(steps = self.state_ref()?.len(), "Problem reported done");
            self.complete = true;
            return Ok(StepOutcome::Done);
        }

        self.push_step(step.clone())?;
        Ok(StepOutcome::Step(step))
    }

    /// Ask a side question about the current step.
    ///
    /// The steps are not touched. The question and the trimmed answer are
    /// appended to the question history, in that order.
    ///
    /// # Errors
    ///
    /// `NotInitialized` before a problem is set, `Transport` for any model
    /// failure. The history is unchanged on error.
    pub async fn ask_question(&mut self, question: &str) -> Result<String, SessionError> {
        let state = self.state_ref()?;
        let system = prompt::question_system(
            &self.system_prompt,
            state.problem(),
            &state.render_context(),
            state.current_step()?,
        );
        let history = serde_json::to_string(&self.question_history)?;
        let request = LlmRequest::single_turn(
            system,
            prompt::question_prompt(&history, question),
            self.max_tokens,
        );

        let response = self.llm.complete(&request).await?;
        let answer = response.first_text().unwrap_or_default().trim().to_string();

        self.question_history.push(question.to_string());
        self.question_history.push(answer.clone());
        tracing::debug!(history_len = self.question_history.len(), "Question answered");
        Ok(answer)
    }

    fn state_ref(&self) -> Result<&LazyState, SessionError> {
        self.state.as_ref().ok_or(SessionError::NotInitialized)
    }

    fn push_step(&mut self, step: String) -> Result<(), SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NotInitialized)?;
        state.append_step(step);
        tracing::debug!(steps = state.len(), "Step appended");
        Ok(())
    }

    /// One next-step request; returns the trimmed, non-empty text without
    /// touching the state.
    async fn request_next_step(&self) -> Result<String, SessionError> {
        let context = self.state_ref()?.render_context();
        let request = LlmRequest::single_turn(self.system_prompt.clone(), context, self.max_tokens);

        let response = self.llm.complete(&request).await?;
        let step = response.first_text().unwrap_or_default().trim();
        if step.is_empty() {
            tracing::warn!(model = %self.model_id(), "Model returned an empty step");
            return Err(SessionError::EmptyResponse);
        }
        Ok(step.to_string())
    }
}
