//! Property-based tests for step navigation.

#[allow(clippy::unwrap_used)]
mod tests {
    use crate::progress::{get_best_next_step, get_best_prev_step, Step};
    use crate::session::Session;
    use proptest::prelude::*;

    /// (should be skipped, completion predicate result if one is declared)
    type StepShape = (bool, Option<bool>);

    fn build(shapes: &[StepShape]) -> Vec<Step> {
        shapes
            .iter()
            .enumerate()
            .map(|(i, &(skip, complete))| {
                let mut step = Step::new(format!("/s{i}"), format!("S{i}")).exact();
                if skip {
                    step = step.skip_when(|_| true);
                }
                if let Some(done) = complete {
                    step = step.complete_when(move |_| done);
                }
                step
            })
            .collect()
    }

    fn index_of(step: &Step) -> usize {
        step.path()[2..].parse().unwrap()
    }

    fn shapes() -> impl Strategy<Value = Vec<StepShape>> {
        prop::collection::vec((any::<bool>(), prop::option::of(any::<bool>())), 1..12)
    }

    proptest! {
        #[test]
        fn test_best_prev_returns_first_incomplete_unskipped(
            shapes in shapes(),
            pick in any::<prop::sample::Index>(),
        ) {
            let steps = build(&shapes);
            let from = pick.index(steps.len());
            let session = Session::default();

            let expected = (0..from)
                .rev()
                .find(|&i| !shapes[i].0 && shapes[i].1 != Some(true));
            let actual = get_best_prev_step(&session, steps[from].path(), &steps).map(index_of);

            prop_assert_eq!(actual, expected);
            if let Some(i) = actual {
                prop_assert!(!shapes[i].0, "returned a skipped step");
                prop_assert!(i < from);
            }
        }

        #[test]
        fn test_best_next_skips_all_skipped_steps(
            shapes in shapes(),
            pick in any::<prop::sample::Index>(),
        ) {
            let steps = build(&shapes);
            let from = pick.index(steps.len());
            let session = Session::default();

            let expected = (from + 1..steps.len()).find(|&i| !shapes[i].0);
            let actual = get_best_next_step(&session, steps[from].path(), &steps).map(index_of);

            prop_assert_eq!(actual, expected);
            if from == steps.len() - 1 {
                prop_assert_eq!(actual, None);
            }
        }
    }
}
