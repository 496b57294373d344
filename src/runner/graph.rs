//! Target dependency graph.
//!
//! The graph holds the pipeline's structural model: nodes in declaration
//! order and three kinds of edges. `depends_on` and `consumes` edges
//! propagate results (a failed predecessor blocks the successor);
//! `before`/`after` edges only constrain relative order. Cycle detection
//! runs over the union of all edges at build time, before anything
//! executes.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::error::{CairnError, Result};
use crate::pipeline::ResolvedTarget;

/// The immutable structural model of a pipeline.
#[derive(Debug, Clone)]
pub struct TargetGraph {
    /// Target names in declaration order (case preserved).
    names: Vec<String>,
    /// Folded name to declaration index.
    index: HashMap<String, usize>,
    /// Result-propagating dependency predecessors per node.
    depends: Vec<Vec<usize>>,
    /// Artifact-producer predecessors per node.
    consumes: Vec<Vec<usize>>,
    /// Ordering-only predecessors per node.
    ordering: Vec<Vec<usize>>,
    /// Union successors per node (deduplicated).
    successors: Vec<Vec<usize>>,
}

impl TargetGraph {
    /// Start building a graph.
    pub fn builder() -> TargetGraphBuilder {
        TargetGraphBuilder::default()
    }

    /// Build the graph from resolved target declarations.
    pub fn from_targets(targets: &[ResolvedTarget]) -> Result<Self> {
        let mut builder = Self::builder();
        for target in targets {
            builder = builder.target(&target.name);
        }
        for target in targets {
            for dep in &target.depends_on {
                builder = builder.depends_on(&target.name, dep);
            }
            for producer in &target.consumes {
                builder = builder.consumes(&target.name, producer);
            }
            for successor in &target.before {
                builder = builder.ordered(&target.name, successor);
            }
            for predecessor in &target.after {
                builder = builder.ordered(predecessor, &target.name);
            }
        }
        builder.build()
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the graph has no targets.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Look up a target's declaration index, case-insensitively.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }

    /// Whether a target exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// The declared name at an index.
    pub fn name_of(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// All declaration indices.
    pub fn all_targets(&self) -> Vec<usize> {
        (0..self.names.len()).collect()
    }

    /// Resolve names to indices, failing on the first unknown.
    pub fn indices_of(&self, names: &[String]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                self.index_of(name).ok_or_else(|| CairnError::UnknownTarget {
                    name: name.clone(),
                })
            })
            .collect()
    }

    /// Result-propagating predecessors (depends-on plus consumes).
    pub fn result_predecessors(&self, index: usize) -> Vec<usize> {
        let mut preds = self.depends[index].clone();
        for &p in &self.consumes[index] {
            if !preds.contains(&p) {
                preds.push(p);
            }
        }
        preds
    }

    /// Artifact-producer predecessors only.
    pub fn consumed_producers(&self, index: usize) -> &[usize] {
        &self.consumes[index]
    }

    /// Every predecessor that constrains this node's position.
    fn all_predecessors(&self, index: usize) -> Vec<usize> {
        let mut preds = self.result_predecessors(index);
        for &p in &self.ordering[index] {
            if !preds.contains(&p) {
                preds.push(p);
            }
        }
        preds
    }

    /// The requested targets plus their transitive dependencies.
    ///
    /// Follows result edges only; ordering edges never pull a target into
    /// the sub-graph. The result is sorted by declaration index.
    pub fn reachable_from(&self, roots: &[usize]) -> Vec<usize> {
        let mut seen: HashSet<usize> = roots.iter().copied().collect();
        let mut queue: VecDeque<usize> = roots.iter().copied().collect();

        while let Some(node) = queue.pop_front() {
            for pred in self.result_predecessors(node) {
                if seen.insert(pred) {
                    queue.push_back(pred);
                }
            }
        }

        let mut reachable: Vec<usize> = seen.into_iter().collect();
        reachable.sort_unstable();
        reachable
    }

    /// One valid topological order of the given sub-graph.
    ///
    /// Respects all edge kinds; among simultaneously-ready targets the
    /// smallest declaration index goes first, so the order is fully
    /// deterministic for a given declaration set.
    pub fn topological_order(&self, subset: &[usize]) -> Result<Vec<usize>> {
        let members: HashSet<usize> = subset.iter().copied().collect();

        let mut in_degree: HashMap<usize, usize> = HashMap::new();
        for &node in subset {
            let degree = self
                .all_predecessors(node)
                .iter()
                .filter(|p| members.contains(p))
                .count();
            in_degree.insert(node, degree);
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&node, _)| Reverse(node))
            .collect();

        let mut order = Vec::with_capacity(subset.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &succ in &self.successors[node] {
                if let Some(degree) = in_degree.get_mut(&succ) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(succ));
                    }
                }
            }
        }

        if order.len() != subset.len() {
            let cycle = self
                .find_cycle()
                .map(|path| path.join(" -> "))
                .unwrap_or_else(|| "unknown".to_string());
            return Err(CairnError::DependencyCycle { cycle });
        }

        Ok(order)
    }

    /// Stages of mutually-unordered targets for the parallel mode.
    ///
    /// Two targets connected by any edge land in different stages, so a
    /// stage boundary is a join barrier. Targets within a stage are in
    /// declaration order.
    pub fn parallel_stages(&self, subset: &[usize]) -> Vec<Vec<usize>> {
        let members: HashSet<usize> = subset.iter().copied().collect();
        let mut completed: HashSet<usize> = HashSet::new();
        let mut stages = Vec::new();

        while completed.len() < members.len() {
            let mut stage: Vec<usize> = subset
                .iter()
                .copied()
                .filter(|node| !completed.contains(node))
                .filter(|&node| {
                    self.all_predecessors(node)
                        .iter()
                        .all(|p| !members.contains(p) || completed.contains(p))
                })
                .collect();

            if stage.is_empty() {
                break;
            }

            stage.sort_unstable();
            completed.extend(stage.iter().copied());
            stages.push(stage);
        }

        stages
    }

    /// Find a cycle over the union of all edges, returning its path.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs(
            node: usize,
            graph: &TargetGraph,
            state: &mut Vec<State>,
            path: &mut Vec<usize>,
        ) -> Option<Vec<usize>> {
            state[node] = State::Visiting;
            path.push(node);

            for pred in graph.all_predecessors(node) {
                match state[pred] {
                    State::Visiting => {
                        let start = path.iter().position(|&n| n == pred).unwrap();
                        let mut cycle: Vec<usize> = path[start..].to_vec();
                        cycle.push(pred);
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(pred, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state[node] = State::Visited;
            None
        }

        let mut state = vec![State::Unvisited; self.names.len()];
        let mut path = Vec::new();

        for node in 0..self.names.len() {
            if state[node] == State::Unvisited {
                if let Some(cycle) = dfs(node, self, &mut state, &mut path) {
                    return Some(cycle.into_iter().map(|n| self.names[n].clone()).collect());
                }
            }
        }

        None
    }
}

/// Builder for [`TargetGraph`].
#[derive(Debug, Default)]
pub struct TargetGraphBuilder {
    names: Vec<String>,
    depends: Vec<(String, String)>,
    consumes: Vec<(String, String)>,
    ordering: Vec<(String, String)>,
}

impl TargetGraphBuilder {
    /// Register a target.
    pub fn target(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Add a result-propagating dependency edge.
    pub fn depends_on(mut self, target: impl Into<String>, dependency: impl Into<String>) -> Self {
        self.depends.push((target.into(), dependency.into()));
        self
    }

    /// Add an artifact-consumption edge.
    pub fn consumes(mut self, target: impl Into<String>, producer: impl Into<String>) -> Self {
        self.consumes.push((target.into(), producer.into()));
        self
    }

    /// Add an ordering-only edge: `predecessor` runs before `successor`.
    pub fn ordered(mut self, predecessor: impl Into<String>, successor: impl Into<String>) -> Self {
        self.ordering.push((predecessor.into(), successor.into()));
        self
    }

    /// Build the graph, validating names and checking for cycles.
    pub fn build(self) -> Result<TargetGraph> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, name) in self.names.iter().enumerate() {
            if index.insert(name.to_lowercase(), i).is_some() {
                return Err(CairnError::Configuration {
                    message: format!("duplicate target name '{}'", name),
                });
            }
        }

        let resolve = |name: &str, referrer: &str| -> Result<usize> {
            index
                .get(&name.to_lowercase())
                .copied()
                .ok_or_else(|| CairnError::Configuration {
                    message: format!(
                        "target '{}' references unknown target '{}'",
                        referrer, name
                    ),
                })
        };

        let n = self.names.len();
        let mut depends = vec![Vec::new(); n];
        let mut consumes = vec![Vec::new(); n];
        let mut ordering = vec![Vec::new(); n];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];

        fn add_edge(
            preds: &mut [Vec<usize>],
            successors: &mut [Vec<usize>],
            target: usize,
            pred: usize,
        ) {
            if !preds[target].contains(&pred) {
                preds[target].push(pred);
            }
            if !successors[pred].contains(&target) {
                successors[pred].push(target);
            }
        }

        for (target, dep) in &self.depends {
            let t = resolve(target, target)?;
            let d = resolve(dep, target)?;
            add_edge(&mut depends, &mut successors, t, d);
        }
        for (target, producer) in &self.consumes {
            let t = resolve(target, target)?;
            let p = resolve(producer, target)?;
            add_edge(&mut consumes, &mut successors, t, p);
        }
        for (predecessor, successor) in &self.ordering {
            let p = resolve(predecessor, predecessor)?;
            let s = resolve(successor, predecessor)?;
            add_edge(&mut ordering, &mut successors, s, p);
        }

        let graph = TargetGraph {
            names: self.names,
            index,
            depends,
            consumes,
            ordering,
            successors,
        };

        if let Some(cycle) = graph.find_cycle() {
            return Err(CairnError::DependencyCycle {
                cycle: cycle.join(" -> "),
            });
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(graph: &TargetGraph, indices: &[usize]) -> Vec<String> {
        indices.iter().map(|&i| graph.name_of(i).to_string()).collect()
    }

    #[test]
    fn builder_creates_empty_graph() {
        let graph = TargetGraph::builder().build().unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let graph = TargetGraph::builder().target("Compile").build().unwrap();
        assert!(graph.contains("compile"));
        assert!(graph.contains("COMPILE"));
        assert_eq!(graph.name_of(graph.index_of("compile").unwrap()), "Compile");
    }

    #[test]
    fn duplicate_names_rejected() {
        let result = TargetGraph::builder()
            .target("compile")
            .target("Compile")
            .build();
        assert!(matches!(result, Err(CairnError::Configuration { .. })));
    }

    #[test]
    fn unknown_edge_reference_rejected() {
        let result = TargetGraph::builder()
            .target("compile")
            .depends_on("compile", "restore")
            .build();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("unknown target 'restore'"));
    }

    #[test]
    fn simple_cycle_rejected_with_path() {
        let result = TargetGraph::builder()
            .target("a")
            .target("b")
            .depends_on("a", "b")
            .depends_on("b", "a")
            .build();

        match result {
            Err(CairnError::DependencyCycle { cycle }) => {
                assert!(cycle.contains("a"));
                assert!(cycle.contains("b"));
                assert!(cycle.contains("->"));
            }
            other => panic!("expected cycle error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn self_cycle_rejected() {
        let result = TargetGraph::builder()
            .target("a")
            .depends_on("a", "a")
            .build();
        assert!(matches!(result, Err(CairnError::DependencyCycle { .. })));
    }

    #[test]
    fn ordering_edges_participate_in_cycle_detection() {
        let result = TargetGraph::builder()
            .target("a")
            .target("b")
            .depends_on("a", "b")
            .ordered("a", "b")
            .build();
        assert!(matches!(result, Err(CairnError::DependencyCycle { .. })));
    }

    #[test]
    fn topo_order_linear_chain() {
        let graph = TargetGraph::builder()
            .target("restore")
            .target("compile")
            .target("pack")
            .depends_on("compile", "restore")
            .depends_on("pack", "compile")
            .build()
            .unwrap();

        let order = graph.topological_order(&graph.all_targets()).unwrap();
        assert_eq!(names(&graph, &order), vec!["restore", "compile", "pack"]);
    }

    #[test]
    fn topo_order_breaks_ties_by_declaration_order() {
        let graph = TargetGraph::builder()
            .target("zeta")
            .target("alpha")
            .target("mid")
            .build()
            .unwrap();

        let order = graph.topological_order(&graph.all_targets()).unwrap();
        // No edges: declaration order wins, not alphabetical order.
        assert_eq!(names(&graph, &order), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn topo_order_respects_ordering_edges() {
        // pack declared after unit-test but must run before it.
        let graph = TargetGraph::builder()
            .target("compile")
            .target("unit-test")
            .target("pack")
            .depends_on("unit-test", "compile")
            .depends_on("pack", "compile")
            .ordered("pack", "unit-test")
            .build()
            .unwrap();

        let order = graph.topological_order(&graph.all_targets()).unwrap();
        let pack = order.iter().position(|&i| graph.name_of(i) == "pack").unwrap();
        let test = order
            .iter()
            .position(|&i| graph.name_of(i) == "unit-test")
            .unwrap();
        assert!(pack < test);
    }

    #[test]
    fn reachable_follows_dependencies_not_dependents() {
        // restore <- compile <- {unit-test, pack}
        let graph = TargetGraph::builder()
            .target("restore")
            .target("compile")
            .target("unit-test")
            .target("pack")
            .depends_on("compile", "restore")
            .depends_on("unit-test", "compile")
            .depends_on("pack", "compile")
            .build()
            .unwrap();

        let pack = graph.index_of("pack").unwrap();
        let reachable = graph.reachable_from(&[pack]);

        let mut found = names(&graph, &reachable);
        found.sort();
        assert_eq!(found, vec!["compile", "pack", "restore"]);
    }

    #[test]
    fn reachable_ignores_ordering_edges() {
        let graph = TargetGraph::builder()
            .target("pack")
            .target("unit-test")
            .ordered("pack", "unit-test")
            .build()
            .unwrap();

        let test = graph.index_of("unit-test").unwrap();
        let reachable = graph.reachable_from(&[test]);
        assert_eq!(names(&graph, &reachable), vec!["unit-test"]);
    }

    #[test]
    fn reachable_follows_consumes_edges() {
        let graph = TargetGraph::builder()
            .target("pack")
            .target("publish")
            .consumes("publish", "pack")
            .build()
            .unwrap();

        let publish = graph.index_of("publish").unwrap();
        let reachable = graph.reachable_from(&[publish]);
        assert_eq!(names(&graph, &reachable), vec!["pack", "publish"]);
    }

    #[test]
    fn diamond_topo_order_is_deterministic() {
        let graph = TargetGraph::builder()
            .target("d")
            .target("b")
            .target("c")
            .target("a")
            .depends_on("b", "d")
            .depends_on("c", "d")
            .depends_on("a", "b")
            .depends_on("a", "c")
            .build()
            .unwrap();

        let first = graph.topological_order(&graph.all_targets()).unwrap();
        let second = graph.topological_order(&graph.all_targets()).unwrap();
        assert_eq!(first, second);
        assert_eq!(names(&graph, &first), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn parallel_stages_diamond() {
        let graph = TargetGraph::builder()
            .target("d")
            .target("b")
            .target("c")
            .target("a")
            .depends_on("b", "d")
            .depends_on("c", "d")
            .depends_on("a", "b")
            .depends_on("a", "c")
            .build()
            .unwrap();

        let stages = graph.parallel_stages(&graph.all_targets());
        assert_eq!(stages.len(), 3);
        assert_eq!(names(&graph, &stages[0]), vec!["d"]);
        assert_eq!(names(&graph, &stages[1]), vec!["b", "c"]);
        assert_eq!(names(&graph, &stages[2]), vec!["a"]);
    }

    #[test]
    fn parallel_stages_separate_ordered_targets() {
        let graph = TargetGraph::builder()
            .target("pack")
            .target("unit-test")
            .ordered("pack", "unit-test")
            .build()
            .unwrap();

        let stages = graph.parallel_stages(&graph.all_targets());
        assert_eq!(stages.len(), 2);
        assert_eq!(names(&graph, &stages[0]), vec!["pack"]);
        assert_eq!(names(&graph, &stages[1]), vec!["unit-test"]);
    }

    #[test]
    fn indices_of_reports_unknown_target() {
        let graph = TargetGraph::builder().target("compile").build().unwrap();
        let err = graph.indices_of(&["deploy".to_string()]).unwrap_err();
        assert!(matches!(err, CairnError::UnknownTarget { .. }));
    }

    #[test]
    fn from_targets_wires_all_edge_kinds() {
        let mut pack = ResolvedTarget::new("pack");
        pack.depends_on = vec!["compile".into()];
        pack.before = vec!["unit-test".into()];

        let mut publish = ResolvedTarget::new("publish");
        publish.depends_on = vec!["pack".into()];
        publish.consumes = vec!["pack".into()];

        let mut test = ResolvedTarget::new("unit-test");
        test.depends_on = vec!["compile".into()];

        let targets = vec![
            ResolvedTarget::new("compile"),
            test,
            pack,
            publish,
        ];
        let graph = TargetGraph::from_targets(&targets).unwrap();

        let order = graph.topological_order(&graph.all_targets()).unwrap();
        let pack_pos = order.iter().position(|&i| graph.name_of(i) == "pack").unwrap();
        let test_pos = order
            .iter()
            .position(|&i| graph.name_of(i) == "unit-test")
            .unwrap();
        assert!(pack_pos < test_pos);

        let publish_idx = graph.index_of("publish").unwrap();
        let pack_idx = graph.index_of("pack").unwrap();
        assert_eq!(graph.consumed_producers(publish_idx), &[pack_idx]);
    }
}
