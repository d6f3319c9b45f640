//! Linear record of problem-solving steps
//!
//! Step 0 is always the problem statement itself. Steps are only ever
//! appended, and the cursor always addresses the last one.

#[cfg(test)]
mod proptests;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("cursor {cursor} does not address a step (have {len})")]
    InvalidState { cursor: usize, len: usize },
}

/// Problem statement plus the steps taken toward it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LazyState {
    problem: String,
    steps: Vec<String>,
    cursor: usize,
}

impl LazyState {
    pub fn new(problem: impl Into<String>) -> Self {
        let problem = problem.into();
        Self {
            steps: vec![problem.clone()],
            problem,
            cursor: 0,
        }
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of steps, counting the problem statement
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a state built through [`LazyState::new`]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a step and move the cursor onto it. Content is not validated.
    pub fn append_step(&mut self, step: impl Into<String>) {
        self.steps.push(step.into());
        self.cursor = self.steps.len() - 1;
    }

    /// The step under the cursor.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the cursor is out of range, which only a
    /// hand-edited deserialized snapshot can produce.
    pub fn current_step(&self) -> Result<&str, StateError> {
        self.steps
            .get(self.cursor)
            .map(String::as_str)
            .ok_or(StateError::InvalidState {
                cursor: self.cursor,
                len: self.steps.len(),
            })
    }

    /// Problem and steps rendered as model input.
    ///
    /// Layout: `Problem: <problem> \n Steps so far: [<s0>, <s1>, ...]`. The
    /// model sees this verbatim, so the layout is part of the prompt contract.
    pub fn render_context(&self) -> String {
        format!(
            "Problem: {} \n Steps so far: [{}]",
            self.problem,
            self.steps.join(", ")
        )
    }

    /// Drop every step after the problem statement
    pub fn refresh(&mut self) {
        self.steps.clear();
        self.steps.push(self.problem.clone());
        self.cursor = 0;
    }
}
