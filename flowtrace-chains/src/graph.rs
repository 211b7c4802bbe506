//! Execution order and parallel-group detection (spec.md §4.4,
//! "Execution order"): Kahn's algorithm over the non-parallel chain
//! edges, with a defensive fallback for cycles that should not occur
//! given `fromStep < toStep`.

use std::collections::HashMap;

/// Topologically sort `0..node_count` given `from -> to` edges. On a
/// cycle, the remaining unsortable nodes are appended in their original
/// order rather than panicking or looping forever.
pub fn topological_order(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut in_degree = vec![0usize; node_count];
    let mut adjacency: Vec<Vec<usize>> = vec![vec![]; node_count];
    for &(from, to) in edges {
        adjacency[from].push(to);
        in_degree[to] += 1;
    }

    let mut queue: std::collections::VecDeque<usize> =
        (0..node_count).filter(|&n| in_degree[n] == 0).collect();
    let mut order = vec![];
    let mut visited = vec![false; node_count];

    while let Some(node) = queue.pop_front() {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        order.push(node);
        for &next in &adjacency[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() < node_count {
        tracing::warn!("cycle detected in chain graph, appending remaining steps in original order");
        for n in 0..node_count {
            if !visited[n] {
                order.push(n);
            }
        }
    }
    order
}

/// Depth of each node: 0 for nodes with no incoming edge, otherwise
/// `1 + max(depth[predecessor])`. Assumes `edges` is acyclic; a
/// defensive cap prevents runaway recursion if it isn't.
fn depths(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut predecessors: Vec<Vec<usize>> = vec![vec![]; node_count];
    for &(from, to) in edges {
        predecessors[to].push(from);
    }
    let order = topological_order(node_count, edges);
    let mut depth = vec![0usize; node_count];
    for &node in &order {
        let max_pred_depth = predecessors[node].iter().map(|&p| depth[p]).max();
        if let Some(d) = max_pred_depth {
            depth[node] = d + 1;
        }
    }
    depth
}

/// Maximal sets of steps sharing the same topological depth, size ≥ 2.
pub fn parallel_groups(node_count: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let depth = depths(node_count, edges);
    let mut by_depth: HashMap<usize, Vec<usize>> = HashMap::new();
    for (node, &d) in depth.iter().enumerate() {
        by_depth.entry(d).or_default().push(node);
    }
    let mut groups: Vec<Vec<usize>> = by_depth
        .into_values()
        .filter(|members| members.len() >= 2)
        .collect();
    for group in &mut groups {
        group.sort_unstable();
    }
    groups.sort_by_key(|g| g[0]);
    groups
}
