//! Property tests for session operations against a scripted model

use super::{EvaluationSession, SessionError};
use crate::llm::testing::MockLlmService;
use proptest::prelude::*;
use std::sync::Arc;

/// A scripted model reply
#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Blank(String),
}

/// Session operation to apply
#[derive(Debug, Clone)]
enum Op {
    Next(Reply),
    Ask(String, Reply),
    Refresh,
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 _.,=+-]{0,30}"
}

fn arb_reply() -> impl Strategy<Value = Reply> {
    prop_oneof![
        4 => (arb_text(), "[ \t\n]{0,3}", "[ \t\n]{0,3}")
            .prop_map(|(text, pre, post)| Reply::Text(format!("{pre}{text}{post}"))),
        1 => "[ \t\n]{0,4}".prop_map(Reply::Blank),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => arb_reply().prop_map(Op::Next),
        2 => (arb_text(), arb_reply()).prop_map(|(q, r)| Op::Ask(q, r)),
        1 => Just(Op::Refresh),
    ]
}

fn reply_text(reply: &Reply) -> &str {
    match reply {
        Reply::Text(t) | Reply::Blank(t) => t,
    }
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #[test]
    fn prop_session_matches_model(problem in arb_text(), ops in proptest::collection::vec(arb_op(), 0..25)) {
        block_on(async {
            let mock = Arc::new(MockLlmService::new("mock-model"));
            let mut session = EvaluationSession::for_problem(mock.clone(), problem.clone());

            let mut expected_steps = vec![problem.clone()];
            let mut expected_history: Vec<String> = Vec::new();

            for op in ops {
                match op {
                    Op::Next(reply) => {
                        mock.queue_text(reply_text(&reply));
                        let result = session.get_next_step().await;
                        match reply {
                            Reply::Text(text) => {
                                let trimmed = text.trim().to_string();
                                prop_assert_eq!(result.unwrap(), trimmed.clone());
                                expected_steps.push(trimmed);
                            }
                            Reply::Blank(_) => {
                                prop_assert!(matches!(result, Err(SessionError::EmptyResponse)));
                            }
                        }
                    }
                    Op::Ask(question, reply) => {
                        let before = session.current_step().unwrap().to_string();
                        let len_before = session.state().unwrap().len();
                        mock.queue_text(reply_text(&reply));

                        let answer = session.ask_question(&question).await.unwrap();

                        prop_assert_eq!(&answer, reply_text(&reply).trim());
                        prop_assert_eq!(session.current_step().unwrap(), before.as_str());
                        prop_assert_eq!(session.state().unwrap().len(), len_before);
                        expected_history.push(question);
                        expected_history.push(answer);
                    }
                    Op::Refresh => {
                        session.refresh_state().unwrap();
                        expected_steps.truncate(1);
                    }
                }

                let state = session.state().unwrap();
                prop_assert_eq!(state.steps(), expected_steps.as_slice());
                prop_assert_eq!(state.cursor(), expected_steps.len() - 1);
                prop_assert_eq!(session.current_step().unwrap(), expected_steps.last().unwrap().as_str());
                prop_assert_eq!(session.question_history(), expected_history.as_slice());
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
