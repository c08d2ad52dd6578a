//! Coupling graph and layout: the device-connectivity types shared by the
//! layout and routing passes.

use crate::error::{CompileError, CompileResult};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// An undirected graph of physical qubits, built from a flat edge list.
///
/// Node indices are dense in `[0, max_label]`; labels present in no edge are
/// simply isolated nodes. All-pairs BFS distances are precomputed once at
/// construction so SABRE's inner loop can look them up in O(1).
#[derive(Debug, Clone)]
pub struct CouplingMap {
    num_nodes: usize,
    adjacency: Vec<Vec<usize>>,
    /// `dist[a][b]`, `usize::MAX` if unreachable.
    dist_matrix: Vec<Vec<usize>>,
}

impl CouplingMap {
    /// Build a coupling map from an edge list, `(physical_a, physical_b)`
    /// pairs. Node count is `max(endpoint) + 1`.
    pub fn from_edges(edges: &[(usize, usize)]) -> CompileResult<Self> {
        if edges.is_empty() {
            return Err(CompileError::InvalidTopology);
        }
        let num_nodes = edges
            .iter()
            .flat_map(|&(a, b)| [a, b])
            .max()
            .map(|m| m + 1)
            .unwrap_or(0);

        let mut adjacency = vec![Vec::new(); num_nodes];
        for &(a, b) in edges {
            if !adjacency[a].contains(&b) {
                adjacency[a].push(b);
            }
            if !adjacency[b].contains(&a) {
                adjacency[b].push(a);
            }
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }

        let dist_matrix = Self::all_pairs_bfs(&adjacency);
        Ok(Self {
            num_nodes,
            adjacency,
            dist_matrix,
        })
    }

    /// A linear chain `0-1-2-...-(n-1)`.
    pub fn linear(n: usize) -> CompileResult<Self> {
        let edges: Vec<_> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        Self::from_edges(&edges)
    }

    /// A star with `center` connected to every other node in `0..n`.
    pub fn star(n: usize, center: usize) -> CompileResult<Self> {
        let edges: Vec<_> = (0..n).filter(|&i| i != center).map(|i| (center, i)).collect();
        Self::from_edges(&edges)
    }

    /// Number of physical qubits (dense node count).
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Neighbors of `node`, sorted ascending.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    /// BFS distance between two physical qubits, `usize::MAX` if unreachable.
    pub fn distance(&self, a: usize, b: usize) -> usize {
        self.dist_matrix[a][b]
    }

    /// Whether `a` and `b` are adjacent.
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.distance(a, b) == 1
    }

    /// Whether the graph is connected (every node reachable from every
    /// other).
    pub fn is_connected(&self) -> bool {
        self.dist_matrix
            .iter()
            .all(|row| row.iter().all(|&d| d != usize::MAX))
    }

    /// A shortest path from `a` to `b` as a sequence of physical qubits
    /// (inclusive of both endpoints), or `None` if unreachable.
    pub fn shortest_path(&self, a: usize, b: usize) -> Option<Vec<usize>> {
        if self.distance(a, b) == usize::MAX {
            return None;
        }
        let mut path = vec![b];
        let mut current = b;
        while current != a {
            current = *self
                .adjacency[current]
                .iter()
                .find(|&&n| self.dist_matrix[a][n] + 1 == self.dist_matrix[a][current])?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    fn all_pairs_bfs(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
        let n = adjacency.len();
        let mut dist = vec![vec![usize::MAX; n]; n];
        for (source, row) in dist.iter_mut().enumerate() {
            row[source] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(source);
            while let Some(node) = queue.pop_front() {
                let d = row[node];
                for &next in &adjacency[node] {
                    if row[next] == usize::MAX {
                        row[next] = d + 1;
                        queue.push_back(next);
                    }
                }
            }
        }
        dist
    }
}

/// An injective mapping from logical qubits to physical qubits, and its
/// inverse.
#[derive(Debug, Clone)]
pub struct Layout {
    logical_to_physical: Vec<usize>,
    physical_to_logical: FxHashMap<usize, usize>,
}

impl Layout {
    /// The identity layout: `logical == physical` for `0..nqubits`.
    pub fn trivial(nqubits: usize) -> Self {
        let logical_to_physical: Vec<usize> = (0..nqubits).collect();
        let physical_to_logical = logical_to_physical.iter().enumerate().map(|(l, &p)| (p, l)).collect();
        Self {
            logical_to_physical,
            physical_to_logical,
        }
    }

    /// Build a layout from an explicit `logical -> physical` vector,
    /// checking injectivity.
    pub fn from_mapping(mapping: Vec<usize>) -> CompileResult<Self> {
        let mut physical_to_logical = FxHashMap::default();
        for (logical, &physical) in mapping.iter().enumerate() {
            if physical_to_logical.insert(physical, logical).is_some() {
                return Err(CompileError::InvalidCustomLayout {
                    reason: format!("physical qubit {physical} assigned to more than one logical qubit"),
                });
            }
        }
        Ok(Self {
            logical_to_physical: mapping,
            physical_to_logical,
        })
    }

    /// Number of logical qubits this layout covers.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Whether this layout covers no logical qubits.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// `L[logical]`.
    pub fn physical(&self, logical: usize) -> usize {
        self.logical_to_physical[logical]
    }

    /// `L^-1[physical]`, if some logical qubit is mapped there.
    pub fn logical(&self, physical: usize) -> Option<usize> {
        self.physical_to_logical.get(&physical).copied()
    }

    /// Swap the logical qubits currently mapped to physical qubits `a` and
    /// `b` (used by SABRE to apply a SWAP to the running layout).
    pub fn swap_physical(&mut self, a: usize, b: usize) {
        let logical_a = self.physical_to_logical.remove(&a);
        let logical_b = self.physical_to_logical.remove(&b);
        if let Some(l) = logical_a {
            self.logical_to_physical[l] = b;
            self.physical_to_logical.insert(b, l);
        }
        if let Some(l) = logical_b {
            self.logical_to_physical[l] = a;
            self.physical_to_logical.insert(a, l);
        }
    }

    /// The full `logical -> physical` vector.
    pub fn as_slice(&self) -> &[usize] {
        &self.logical_to_physical
    }
}

/// Validate a user-supplied custom layout mapping against a device: must be
/// a total injective map from `0..nqubits` into valid physical qubit labels.
pub fn validate_custom_layout(mapping: &[usize], nqubits: usize, coupling: &CouplingMap) -> CompileResult<()> {
    if mapping.len() != nqubits {
        return Err(CompileError::InvalidCustomLayout {
            reason: format!("expected a mapping of length {nqubits}, got {}", mapping.len()),
        });
    }
    let mut seen = vec![false; coupling.num_nodes()];
    for &physical in mapping {
        if physical >= coupling.num_nodes() {
            return Err(CompileError::InvalidCustomLayout {
                reason: format!("physical qubit {physical} does not exist in the topology"),
            });
        }
        if seen[physical] {
            return Err(CompileError::InvalidCustomLayout {
                reason: format!("physical qubit {physical} assigned to more than one logical qubit"),
            });
        }
        seen[physical] = true;
    }
    Ok(())
}
