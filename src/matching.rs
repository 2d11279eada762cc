//! Maximum-cardinality matching via Edmonds' blossom algorithm.
//!
//! Operates on a small local graph (vertices 0..n, adjacency lists) and
//! augments a caller-provided seed matching, so a cheap greedy pairing
//! can be refined instead of starting from scratch. Used to place the
//! double bonds of conjugated ring systems.

use std::collections::VecDeque;

/// Augment `mate` (vertex -> matched partner) to a maximum-cardinality
/// matching of the graph given by `adj`. The seed must be a valid
/// matching: `mate[v] == Some(w)` iff `mate[w] == Some(v)`.
pub fn maximum_matching(adj: &[Vec<usize>], mate: &mut [Option<usize>]) {
    debug_assert_eq!(adj.len(), mate.len());
    for v in 0..adj.len() {
        if mate[v].is_none() {
            find_augmenting_path(adj, mate, v);
        }
    }
}

/// BFS from `root` over the alternating forest, contracting blossoms as
/// they are found. On success flips the augmenting path and returns true.
fn find_augmenting_path(adj: &[Vec<usize>], mate: &mut [Option<usize>], root: usize) -> bool {
    let n = adj.len();
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut base: Vec<usize> = (0..n).collect();
    let mut in_tree = vec![false; n];
    let mut queue = VecDeque::new();

    in_tree[root] = true;
    queue.push_back(root);

    while let Some(v) = queue.pop_front() {
        for &to in &adj[v] {
            if base[v] == base[to] || mate[v] == Some(to) {
                continue;
            }
            if to == root || mate[to].is_some_and(|m| parent[m].is_some()) {
                // odd cycle: contract the blossom around the common base
                let cur_base = lowest_common_base(&base, mate, &parent, v, to);
                let mut in_blossom = vec![false; n];
                mark_blossom_path(&mut in_blossom, &base, mate, &mut parent, v, cur_base, to);
                mark_blossom_path(&mut in_blossom, &base, mate, &mut parent, to, cur_base, v);
                for i in 0..n {
                    if in_blossom[base[i]] {
                        base[i] = cur_base;
                        if !in_tree[i] {
                            in_tree[i] = true;
                            queue.push_back(i);
                        }
                    }
                }
            } else if parent[to].is_none() {
                parent[to] = Some(v);
                match mate[to] {
                    None => {
                        flip_augmenting_path(mate, &parent, to);
                        return true;
                    }
                    Some(m) => {
                        if !in_tree[m] {
                            in_tree[m] = true;
                            queue.push_back(m);
                        }
                    }
                }
            }
        }
    }
    false
}

/// Walk both tree paths upward to find the first common blossom base.
fn lowest_common_base(
    base: &[usize],
    mate: &[Option<usize>],
    parent: &[Option<usize>],
    a: usize,
    b: usize,
) -> usize {
    let mut seen = vec![false; base.len()];
    let mut v = a;
    loop {
        v = base[v];
        seen[v] = true;
        match mate[v].and_then(|m| parent[m]) {
            Some(p) => v = p,
            None => break,
        }
    }
    let mut v = b;
    loop {
        v = base[v];
        if seen[v] {
            return v;
        }
        v = parent[mate[v].expect("matched on tree path")]
            .expect("tree path reaches the common base");
    }
}

/// Mark every blossom vertex on the path from `v` down to the base `b`,
/// re-rooting parent pointers through `child` so later augmentation can
/// traverse the contracted cycle in either direction.
fn mark_blossom_path(
    in_blossom: &mut [bool],
    base: &[usize],
    mate: &[Option<usize>],
    parent: &mut [Option<usize>],
    mut v: usize,
    b: usize,
    mut child: usize,
) {
    while base[v] != b {
        in_blossom[base[v]] = true;
        let m = mate[v].expect("blossom path alternates matched edges");
        in_blossom[base[m]] = true;
        parent[v] = Some(child);
        child = m;
        v = parent[m].expect("blossom path continues to base");
    }
}

/// Flip matched/unmatched edges along the tree path ending at the
/// exposed vertex `v`.
fn flip_augmenting_path(mate: &mut [Option<usize>], parent: &[Option<usize>], mut v: usize) {
    loop {
        let p = parent[v].expect("augmenting path reaches the root");
        let next = mate[p];
        mate[v] = Some(p);
        mate[p] = Some(v);
        match next {
            Some(w) => v = w,
            None => break,
        }
    }
}

/// Convenience: adjacency lists from an edge list.
pub fn adjacency(n: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut adj = vec![Vec::new(); n];
    for &(a, b) in edges {
        adj[a].push(b);
        adj[b].push(a);
    }
    adj
}
