//! Step customization hooks.
//!
//! A hook is a pure transform over the generated step sequence, applied
//! after base generation and before rendering. Hooks never see a mutable
//! sequence; each receives the accumulated steps and returns a new list.
//! Multiple hooks compose left to right in registration order.

use crate::ci::job::Step;

/// A pure step-sequence transform.
pub type StepHook = Box<dyn Fn(&[Step]) -> Vec<Step>>;

/// An ordered collection of hooks.
#[derive(Default)]
pub struct StepHooks {
    hooks: Vec<StepHook>,
}

impl StepHooks {
    /// No hooks: the identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook after the existing ones.
    pub fn push(&mut self, hook: StepHook) {
        self.hooks.push(hook);
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Apply every hook in registration order.
    pub fn apply(&self, steps: Vec<Step>) -> Vec<Step> {
        self.hooks
            .iter()
            .fold(steps, |current, hook| hook(&current))
    }
}

/// A hook inserting one step at a fixed index.
///
/// The index is clamped to the sequence length, so an insert at 1 into an
/// empty sequence appends.
pub fn insert_at(index: usize, step: Step) -> StepHook {
    Box::new(move |steps| {
        let mut next = steps.to_vec();
        let at = index.min(next.len());
        next.insert(at, step.clone());
        next
    })
}

/// The toolchain bootstrap step, inserted right after checkout.
pub fn setup_toolchain(version: &str) -> Step {
    Step::uses("Setup toolchain", "dtolnay/rust-toolchain@master")
        .with_arg("toolchain", version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_steps() -> Vec<Step> {
        vec![
            Step::uses("Checkout", "actions/checkout@v4"),
            Step::run("Compile", "cairn run compile --skip"),
        ]
    }

    #[test]
    fn empty_hooks_are_identity() {
        let hooks = StepHooks::new();
        let steps = base_steps();
        assert_eq!(hooks.apply(steps.clone()), steps);
    }

    #[test]
    fn insert_at_places_step_at_fixed_index() {
        let mut hooks = StepHooks::new();
        hooks.push(insert_at(1, setup_toolchain("1.93")));

        let result = hooks.apply(base_steps());

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].name, "Checkout");
        assert_eq!(result[1].name, "Setup toolchain");
        assert_eq!(result[1].with.get("toolchain").unwrap(), "1.93");
        assert_eq!(result[2].name, "Compile");
    }

    #[test]
    fn insert_index_is_clamped() {
        let mut hooks = StepHooks::new();
        hooks.push(insert_at(99, Step::run("Last", "true")));

        let result = hooks.apply(base_steps());
        assert_eq!(result.last().unwrap().name, "Last");
    }

    #[test]
    fn hooks_compose_left_to_right() {
        let mut hooks = StepHooks::new();
        hooks.push(insert_at(0, Step::run("First", "true")));
        hooks.push(insert_at(0, Step::run("Newer first", "true")));

        let result = hooks.apply(base_steps());
        assert_eq!(result[0].name, "Newer first");
        assert_eq!(result[1].name, "First");
    }

    #[test]
    fn hook_does_not_mutate_input() {
        let mut hooks = StepHooks::new();
        hooks.push(insert_at(0, Step::run("Added", "true")));

        let original = base_steps();
        let result = hooks.apply(original.clone());

        assert_eq!(original.len(), 2);
        assert_eq!(result.len(), 3);
    }
}
