//! Enumeration of all shortest paths and disjoint path selection.
//!
//! A [`ShortestPathDag`] records, for every node reached by a bounded BFS,
//! all predecessors lying on some shortest path from the source. Every
//! shortest path to a target can then be read back without another search.
//!
//! Disjoint selection walks the DAG backwards from the target once per
//! path, in random predecessor order, steering around interiors claimed by
//! earlier picks. It never materializes the full path set, whose size grows
//! binomially with grid distance.

use super::Path;
use dfgen_fabric::{FabricGraph, FabricNode};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};

/// Upper bound on paths enumerated for one endpoint pair.
pub const MAX_ENUMERATED_PATHS: usize = 4096;

/// Greedy rounds [`ShortestPathDag::disjoint_paths`] tries per endpoint.
pub const DISJOINT_SELECTION_ROUNDS: usize = 16;

/// Layered shortest-path DAG rooted at one source.
#[derive(Debug, Clone)]
pub struct ShortestPathDag {
    source: FabricNode,
    dist: HashMap<FabricNode, usize>,
    preds: HashMap<FabricNode, Vec<FabricNode>>,
}

impl ShortestPathDag {
    /// Runs a bounded BFS from `source` following outgoing edges.
    ///
    /// Nodes for which `blocked` holds are not entered; `source` is exempt.
    pub fn build(
        graph: &FabricGraph,
        source: FabricNode,
        max_len: usize,
        blocked: impl Fn(FabricNode) -> bool,
    ) -> Self {
        let mut dist = HashMap::new();
        let mut preds: HashMap<FabricNode, Vec<FabricNode>> = HashMap::new();
        let mut queue = VecDeque::new();
        if graph.contains_node(source) {
            dist.insert(source, 0);
            queue.push_back(source);
        }

        while let Some(node) = queue.pop_front() {
            let d = dist[&node];
            if d >= max_len {
                continue;
            }
            for next in graph.successors(node) {
                if next == source || blocked(next) {
                    continue;
                }
                match dist.get(&next) {
                    None => {
                        dist.insert(next, d + 1);
                        preds.entry(next).or_default().push(node);
                        queue.push_back(next);
                    }
                    Some(&nd) if nd == d + 1 => preds.entry(next).or_default().push(node),
                    Some(_) => {}
                }
            }
        }

        Self {
            source,
            dist,
            preds,
        }
    }

    /// The root of the DAG.
    pub fn source(&self) -> FabricNode {
        self.source
    }

    /// Shortest distance from the source, if reached.
    pub fn distance(&self, node: FabricNode) -> Option<usize> {
        self.dist.get(&node).copied()
    }

    /// Enumerates up to `cap` shortest paths from the source to `target`.
    pub fn paths_to(&self, target: FabricNode, cap: usize) -> Vec<Path> {
        if !self.dist.contains_key(&target) || cap == 0 {
            return Vec::new();
        }

        let mut paths = Vec::new();
        // Partial paths are built backwards from the target.
        let mut stack = vec![vec![target]];
        while let Some(partial) = stack.pop() {
            let Some(&head) = partial.last() else {
                continue;
            };
            if head == self.source {
                let mut path = partial;
                path.reverse();
                paths.push(path);
                if paths.len() >= cap {
                    break;
                }
                continue;
            }
            for &pred in self.preds.get(&head).into_iter().flatten() {
                let mut next = partial.clone();
                next.push(pred);
                stack.push(next);
            }
        }
        paths
    }

    /// Finds one shortest path to `target` whose interior avoids `avoid`.
    ///
    /// Predecessors are tried in random order, so repeated calls sample
    /// different paths. Returns `None` if every shortest path touches `avoid`.
    pub fn path_avoiding<R: Rng + ?Sized>(
        &self,
        target: FabricNode,
        avoid: &HashSet<FabricNode>,
        rng: &mut R,
    ) -> Option<Path> {
        if !self.dist.contains_key(&target) {
            return None;
        }
        let mut path = vec![target];
        let mut dead = HashSet::new();
        if !self.walk_back(target, avoid, &mut dead, &mut path, rng) {
            return None;
        }
        path.reverse();
        Some(path)
    }

    // `dead` holds nodes with no way back to the source around `avoid`.
    fn walk_back<R: Rng + ?Sized>(
        &self,
        node: FabricNode,
        avoid: &HashSet<FabricNode>,
        dead: &mut HashSet<FabricNode>,
        path: &mut Path,
        rng: &mut R,
    ) -> bool {
        if node == self.source {
            return true;
        }
        let mut preds = self.preds.get(&node).cloned().unwrap_or_default();
        preds.shuffle(rng);
        for pred in preds {
            if dead.contains(&pred) || (pred != self.source && avoid.contains(&pred)) {
                continue;
            }
            path.push(pred);
            if self.walk_back(pred, avoid, dead, path, &mut *rng) {
                return true;
            }
            path.pop();
            dead.insert(pred);
        }
        false
    }

    /// Picks `k` internally disjoint shortest paths to `target`.
    ///
    /// Each round picks greedily: every path avoids the interiors of earlier
    /// picks. An early pick can cut off the remaining ones, so a failed round
    /// is retried from scratch up to [`DISJOINT_SELECTION_ROUNDS`] times. The
    /// number of nodes not yet `used` across the batch must stay within
    /// `budget`. Returns `None` unless exactly `k` paths were found.
    pub fn disjoint_paths<R: Rng + ?Sized>(
        &self,
        target: FabricNode,
        k: usize,
        budget: usize,
        used: impl Fn(FabricNode) -> bool,
        rng: &mut R,
    ) -> Option<Vec<Path>> {
        if k == 0 || target == self.source || !self.dist.contains_key(&target) {
            return None;
        }
        (0..DISJOINT_SELECTION_ROUNDS)
            .find_map(|_| self.greedy_round(target, k, budget, &used, &mut *rng))
    }

    fn greedy_round<R: Rng + ?Sized>(
        &self,
        target: FabricNode,
        k: usize,
        budget: usize,
        used: &impl Fn(FabricNode) -> bool,
        rng: &mut R,
    ) -> Option<Vec<Path>> {
        let mut selected: Vec<Path> = Vec::with_capacity(k);
        let mut interiors: HashSet<FabricNode> = HashSet::new();
        let mut claimed: HashSet<FabricNode> = HashSet::new();

        while selected.len() < k {
            let path = self.path_avoiding(target, &interiors, &mut *rng)?;
            // A direct edge has no interior to steer around.
            if selected.contains(&path) {
                return None;
            }
            let fresh: Vec<FabricNode> = path
                .iter()
                .copied()
                .filter(|&node| !used(node) && !claimed.contains(&node))
                .collect();
            if claimed.len() + fresh.len() > budget {
                return None;
            }
            interiors.extend(path[1..path.len() - 1].iter().copied());
            claimed.extend(fresh);
            selected.push(path);
        }
        Some(selected)
    }
}

/// Lists up to [`MAX_ENUMERATED_PATHS`] shortest paths `source -> target`.
///
/// Interior nodes must not be `blocked`; both endpoints are exempt. Returns
/// an empty list when the target is unreachable within `max_len` edges.
pub fn all_shortest_paths(
    graph: &FabricGraph,
    source: FabricNode,
    target: FabricNode,
    max_len: usize,
    blocked: impl Fn(FabricNode) -> bool,
) -> Vec<Path> {
    let dag = ShortestPathDag::build(graph, source, max_len, |node| {
        node != target && blocked(node)
    });
    dag.paths_to(target, MAX_ENUMERATED_PATHS)
}
