//! Lazy LM - step-at-a-time problem solving with a language model
//!
//! A session keeps a linear log of steps toward solving a problem. The model
//! is asked for exactly one more step on demand, and side questions can be
//! asked about the current step without advancing the log.
//!
//! ```no_run
//! use lazy_lm::{EvaluationSession, LlmConfig, StepOutcome};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LlmConfig::from_env();
//! let llm = config.build_service()?;
//! let mut session = EvaluationSession::for_problem(llm, "Solve 2x + 3 = 7")
//!     .with_max_tokens(config.max_tokens);
//!
//! while let StepOutcome::Step(step) = session.advance().await? {
//!     println!("{step}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod llm;
pub mod session;
pub mod state;

pub use llm::{AnthropicService, LlmConfig, LlmError, LlmErrorKind, LlmService, LoggingService};
pub use session::{EvaluationSession, HistoryPolicy, SessionError, StepOutcome};
pub use state::{LazyState, StateError};
