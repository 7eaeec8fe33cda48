//! Navigation between the steps of a flow

use tracing::warn;

use super::step::Step;
use crate::session::Session;

/// Direction of travel through a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

fn position_of(pathname: &str, steps: &[Step]) -> Option<usize> {
    steps.iter().position(|step| step.matches(pathname))
}

/// Index of the first step whose route matches the pathname.
///
/// An unknown pathname is not fatal: it is logged and reported as `None`,
/// which callers treat as "not on any step".
pub fn get_step_index_for_pathname(pathname: &str, steps: &[Step]) -> Option<usize> {
    let index = position_of(pathname, steps);
    if index.is_none() {
        warn!(pathname, "Pathname does not match any progress step");
    }
    index
}

/// The step immediately before or after the one at `path`
pub fn get_relative_step<'a>(
    path: &str,
    direction: Direction,
    steps: &'a [Step],
) -> Option<&'a Step> {
    let index = get_step_index_for_pathname(path, steps)?;
    match direction {
        Direction::Prev => index.checked_sub(1).and_then(|i| steps.get(i)),
        Direction::Next => steps.get(index + 1),
    }
}

/// The step the "back" button should lead to.
///
/// Walking backward, skippable steps and completed steps are passed over;
/// the first incomplete step is returned. Steps without a completion
/// predicate count as incomplete, so ordinary back navigation lands on them.
/// Reaching a `never_go_back_to` step ends the walk with `None`.
pub fn get_best_prev_step<'a>(
    session: &Session,
    path: &str,
    steps: &'a [Step],
) -> Option<&'a Step> {
    let index = get_step_index_for_pathname(path, steps)?;
    for step in steps[..index].iter().rev() {
        if step.should_be_skipped(session) {
            continue;
        }
        if step.is_never_go_back_to() {
            return None;
        }
        if step.is_complete_for_back_navigation(session) {
            continue;
        }
        return Some(step);
    }
    None
}

/// The step the "next" button should lead to. Only skip predicates are
/// consulted; completion does not matter going forward.
pub fn get_best_next_step<'a>(
    session: &Session,
    path: &str,
    steps: &'a [Step],
) -> Option<&'a Step> {
    let index = get_step_index_for_pathname(path, steps)?;
    steps[index + 1..]
        .iter()
        .find(|step| !step.should_be_skipped(session))
}

/// Path of the most advanced step the session has reached: the last
/// non-skipped step whose completion predicate holds (steps without one
/// count as complete), or the first step when none qualify.
///
/// Returns `None` only for an empty flow.
pub fn get_latest_step_path<'a>(session: &Session, steps: &'a [Step]) -> Option<&'a str> {
    let first = steps.first()?;
    let latest = steps
        .iter()
        .filter(|step| !step.should_be_skipped(session))
        .filter(|step| step.is_complete_for_latest_step(session))
        .last()
        .unwrap_or(first);
    Some(latest.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in() -> Session {
        Session {
            user_id: Some(1),
            ..Default::default()
        }
    }

    fn steps() -> Vec<Step> {
        vec![
            Step::new("/a", "A").exact(),
            Step::new("/b", "B").exact().skip_when(|s| s.is_logged_in()),
            Step::new("/c", "C").exact().complete_when(|s| s.is_logged_in()),
            Step::new("/d", "D").exact(),
        ]
    }

    #[test]
    fn test_index_for_pathname() {
        let steps = steps();
        assert_eq!(get_step_index_for_pathname("/c", &steps), Some(2));
        assert_eq!(get_step_index_for_pathname("/zzz", &steps), None);
    }

    #[test]
    fn test_first_match_wins() {
        let steps = vec![Step::new("/a", "Outer"), Step::new("/a/b", "Inner")];
        assert_eq!(get_step_index_for_pathname("/a/b", &steps), Some(0));
    }

    #[test]
    fn test_relative_step_boundaries() {
        let steps = steps();
        assert!(get_relative_step("/a", Direction::Prev, &steps).is_none());
        assert!(get_relative_step("/d", Direction::Next, &steps).is_none());
        assert_eq!(
            get_relative_step("/b", Direction::Next, &steps).unwrap().path(),
            "/c"
        );
        assert!(get_relative_step("/nope", Direction::Next, &steps).is_none());
    }

    #[test]
    fn test_best_next_skips_skippable_steps() {
        let steps = steps();
        let next = get_best_next_step(&logged_in(), "/a", &steps).unwrap();
        assert_eq!(next.path(), "/c");

        let next = get_best_next_step(&Session::default(), "/a", &steps).unwrap();
        assert_eq!(next.path(), "/b");
    }

    #[test]
    fn test_best_next_ignores_completion() {
        let steps = steps();
        let next = get_best_next_step(&logged_in(), "/b", &steps).unwrap();
        assert_eq!(next.path(), "/c");
    }

    #[test]
    fn test_best_next_is_none_at_end() {
        assert!(get_best_next_step(&Session::default(), "/d", &steps()).is_none());
    }

    #[test]
    fn test_best_prev_passes_over_completed_and_skipped_steps() {
        let steps = steps();
        let prev = get_best_prev_step(&logged_in(), "/d", &steps).unwrap();
        assert_eq!(prev.path(), "/a");
    }

    #[test]
    fn test_best_prev_stops_at_incomplete_step() {
        let steps = steps();
        let prev = get_best_prev_step(&Session::default(), "/d", &steps).unwrap();
        assert_eq!(prev.path(), "/c");
    }

    #[test]
    fn test_best_prev_stops_at_never_go_back_to() {
        let steps = vec![
            Step::new("/a", "A").exact(),
            Step::new("/b", "B").exact().never_go_back_to(),
            Step::new("/c", "C").exact(),
        ];
        assert!(get_best_prev_step(&Session::default(), "/c", &steps).is_none());
        assert_eq!(
            get_best_prev_step(&Session::default(), "/b", &steps)
                .unwrap()
                .path(),
            "/a"
        );
    }

    #[test]
    fn test_skipped_never_go_back_to_step_is_not_a_barrier() {
        let steps = vec![
            Step::new("/a", "A").exact(),
            Step::new("/b", "B")
                .exact()
                .never_go_back_to()
                .skip_when(|_| true),
            Step::new("/c", "C").exact(),
        ];
        let prev = get_best_prev_step(&Session::default(), "/c", &steps).unwrap();
        assert_eq!(prev.path(), "/a");
    }

    #[test]
    fn test_latest_step() {
        let steps = vec![
            Step::new("/a", "A").exact(),
            Step::new("/b", "B").exact().complete_when(|s| s.is_logged_in()),
            Step::new("/c", "C")
                .exact()
                .complete_when(|s| s.onboarding_info.is_some()),
        ];
        assert_eq!(get_latest_step_path(&Session::default(), &steps), Some("/a"));
        assert_eq!(get_latest_step_path(&logged_in(), &steps), Some("/b"));
    }

    #[test]
    fn test_latest_step_defaults_to_first() {
        let steps = vec![
            Step::new("/a", "A").complete_when(|_| false),
            Step::new("/b", "B").complete_when(|_| false),
        ];
        assert_eq!(get_latest_step_path(&Session::default(), &steps), Some("/a"));
        assert_eq!(get_latest_step_path(&Session::default(), &[]), None);
    }

    #[test]
    fn test_latest_step_ignores_skipped_steps() {
        let steps = vec![
            Step::new("/a", "A").complete_when(|_| false),
            Step::new("/b", "B").skip_when(|_| true),
        ];
        assert_eq!(get_latest_step_path(&Session::default(), &steps), Some("/a"));
    }
}
