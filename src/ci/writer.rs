//! Deterministic workflow rendering.
//!
//! Hand-rolled YAML output instead of a serializer: regeneration must be
//! byte-for-byte stable so diff-based review of the committed workflow
//! file stays meaningful. Everything renders in the order the job model
//! holds it; there is no map iteration that could reorder between runs.

use crate::ci::job::{Step, WorkflowJob};

const HEADER: &str = "# This file was generated by cairn. Do not edit; regenerate with 'cairn generate'.";

/// Render a workflow job to YAML.
pub fn render(job: &WorkflowJob) -> String {
    let mut out = String::new();

    line(&mut out, 0, HEADER);
    blank(&mut out);
    line(&mut out, 0, &format!("name: {}", scalar(&job.name)));
    blank(&mut out);

    line(&mut out, 0, "on:");
    line(&mut out, 1, "push:");
    if !job.on_push_branches.is_empty() {
        line(&mut out, 2, "branches:");
        for branch in &job.on_push_branches {
            line(&mut out, 3, &format!("- {}", scalar(branch)));
        }
    }
    blank(&mut out);

    if !job.permissions.is_empty() {
        line(&mut out, 0, "permissions:");
        for (scope, level) in &job.permissions {
            line(&mut out, 1, &format!("{}: {}", scope, scalar(level)));
        }
        blank(&mut out);
    }

    line(&mut out, 0, "jobs:");
    line(&mut out, 1, &format!("{}:", job.name));
    line(&mut out, 2, &format!("runs-on: {}", scalar(&job.runs_on)));
    if !job.env.is_empty() {
        line(&mut out, 2, "env:");
        for (key, value) in &job.env {
            line(&mut out, 3, &format!("{}: {}", key, scalar(value)));
        }
    }
    line(&mut out, 2, "steps:");
    for step in &job.steps {
        render_step(&mut out, step);
    }

    out
}

fn render_step(out: &mut String, step: &Step) {
    line(out, 3, &format!("- name: {}", scalar(&step.name)));
    if let Some(uses) = &step.uses {
        line(out, 4, &format!("uses: {}", scalar(uses)));
    }
    if let Some(run) = &step.run {
        line(out, 4, &format!("run: {}", scalar(run)));
    }
    if !step.with.is_empty() {
        line(out, 4, "with:");
        for (key, value) in &step.with {
            mapping_entry(out, 5, key, value);
        }
    }
    if !step.env.is_empty() {
        line(out, 4, "env:");
        for (key, value) in &step.env {
            mapping_entry(out, 5, key, value);
        }
    }
}

/// Write `key: value`, switching to a literal block for multi-line values.
fn mapping_entry(out: &mut String, level: usize, key: &str, value: &str) {
    if value.contains('\n') {
        line(out, level, &format!("{}: |", key));
        for part in value.lines() {
            line(out, level + 1, part);
        }
    } else {
        line(out, level, &format!("{}: {}", key, scalar(value)));
    }
}

fn line(out: &mut String, level: usize, text: &str) {
    for _ in 0..level {
        out.push_str("  ");
    }
    out.push_str(text);
    out.push('\n');
}

fn blank(out: &mut String) {
    out.push('\n');
}

/// Quote a scalar only when plain YAML would misread it.
fn scalar(value: &str) -> String {
    let needs_quoting = value.is_empty()
        || value.contains(": ")
        || value.ends_with(':')
        || value.contains(" #")
        || value
            .chars()
            .next()
            .is_some_and(|c| "!&*?|>%@`\"'{}[],#-".contains(c) || c.is_whitespace());

    if needs_quoting {
        format!("'{}'", value.replace('\'', "''"))
    } else {
        value.to_string()
    }
}
