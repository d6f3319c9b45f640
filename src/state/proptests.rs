//! Property tests for the step log

use super::LazyState;
use proptest::prelude::*;

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.!?,=+-]{0,40}"
}

proptest! {
    #[test]
    fn prop_new_state_current_step_is_problem(problem in arb_text()) {
        let state = LazyState::new(problem.clone());
        prop_assert_eq!(state.current_step().unwrap(), problem.as_str());
    }

    #[test]
    fn prop_append_tracks_latest(
        problem in arb_text(),
        appends in proptest::collection::vec(arb_text(), 0..20),
    ) {
        let mut state = LazyState::new(problem);
        for (i, step) in appends.iter().enumerate() {
            state.append_step(step.clone());
            prop_assert_eq!(state.current_step().unwrap(), step.as_str());
            prop_assert_eq!(state.len(), i + 2);
            prop_assert_eq!(state.cursor(), state.len() - 1);
        }
    }

    #[test]
    fn prop_refresh_restores_problem(
        problem in arb_text(),
        appends in proptest::collection::vec(arb_text(), 0..20),
    ) {
        let mut state = LazyState::new(problem.clone());
        for step in appends {
            state.append_step(step);
        }
        state.refresh();
        prop_assert_eq!(state.steps(), std::slice::from_ref(&problem));
        prop_assert_eq!(state.current_step().unwrap(), problem.as_str());
        prop_assert_eq!(state.cursor(), 0);
    }
}
