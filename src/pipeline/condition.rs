//! Condition evaluation against the run context.

use glob::Pattern;

use crate::config::schema::Condition;
use crate::pipeline::context::RunContext;

impl Condition {
    /// Evaluate this condition. Unknown branch or parameter means false,
    /// never an error; a false condition is an ordinary clean skip.
    pub fn evaluate(&self, ctx: &RunContext) -> bool {
        match self {
            Condition::Branch(patterns) => match ctx.branch.as_deref() {
                Some(branch) => patterns.iter().any(|p| {
                    Pattern::new(p)
                        .map(|pattern| pattern.matches(branch))
                        .unwrap_or(false)
                }),
                None => false,
            },
            Condition::EnvSet(var) => ctx.env.get(var).is_some_and(|v| !v.is_empty()),
            Condition::ParamEquals { name, value } => ctx
                .params
                .get(name)
                .is_some_and(|v| v.as_str().eq_ignore_ascii_case(value)),
            Condition::Ci => ctx.is_ci,
        }
    }
}

/// Whether every condition holds. An empty list always holds.
pub fn conditions_hold(conditions: &[Condition], ctx: &RunContext) -> bool {
    conditions.iter().all(|c| c.evaluate(ctx))
}
