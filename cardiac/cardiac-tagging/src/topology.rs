//! Site adjacency for the solver.

use hashbrown::HashSet;
use mesh_types::HexElement;
use rayon::prelude::*;
use tracing::debug;

/// Symmetric neighbor lists, one per site.
///
/// Lists are sorted, contain each neighbor once and never the site itself.
///
/// # Example
///
/// ```
/// use cardiac_tagging::AdjacencyList;
///
/// let adjacency = AdjacencyList::from_elements(9, &[[0, 1, 2, 3, 4, 5, 6, 7]]);
/// assert_eq!(adjacency.neighbors(0), &[1, 2, 3, 4, 5, 6, 7]);
/// assert!(adjacency.neighbors(8).is_empty());
/// assert!(adjacency.is_symmetric());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyList {
    neighbors: Vec<Vec<u32>>,
}

impl AdjacencyList {
    /// Node adjacency: two nodes are neighbors when they share an element.
    ///
    /// Edge sets are gathered per worker and merged by union.
    #[must_use]
    pub fn from_elements(node_count: usize, elements: &[HexElement]) -> Self {
        let edges = elements
            .par_iter()
            .fold(HashSet::new, |mut edges, element| {
                for (k, &a) in element.iter().enumerate() {
                    for &b in &element[k + 1..] {
                        if a != b {
                            edges.insert(edge(a, b));
                        }
                    }
                }
                edges
            })
            .reduce(HashSet::new, union);

        Self::from_edges(node_count, &edges)
    }

    /// Element adjacency: two elements are neighbors when they share a node.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn element_neighbors(node_count: usize, elements: &[HexElement]) -> Self {
        let mut incident: Vec<Vec<u32>> = vec![Vec::new(); node_count];
        for (e, element) in elements.iter().enumerate() {
            for &n in element {
                if let Some(list) = incident.get_mut(n as usize) {
                    if list.last() != Some(&(e as u32)) {
                        list.push(e as u32);
                    }
                }
            }
        }

        let edges = incident
            .par_iter()
            .fold(HashSet::new, |mut edges, shared| {
                for (k, &a) in shared.iter().enumerate() {
                    for &b in &shared[k + 1..] {
                        edges.insert(edge(a, b));
                    }
                }
                edges
            })
            .reduce(HashSet::new, union);

        Self::from_edges(elements.len(), &edges)
    }

    fn from_edges(count: usize, edges: &HashSet<(u32, u32)>) -> Self {
        let mut neighbors = vec![Vec::new(); count];
        for &(a, b) in edges {
            if (a as usize) < count && (b as usize) < count {
                neighbors[a as usize].push(b);
                neighbors[b as usize].push(a);
            }
        }
        neighbors.par_iter_mut().for_each(|list: &mut Vec<u32>| list.sort_unstable());

        debug!(sites = count, edges = edges.len(), "built adjacency");
        Self { neighbors }
    }

    /// Number of sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether there are no sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Neighbors of a site, empty when out of range.
    #[must_use]
    pub fn neighbors(&self, site: usize) -> &[u32] {
        self.neighbors.get(site).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Iterate over the neighbor lists in site order.
    pub fn iter(&self) -> impl Iterator<Item = &[u32]> {
        self.neighbors.iter().map(Vec::as_slice)
    }

    /// Check that every edge appears in both directions.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.neighbors.iter().enumerate().all(|(a, list)| {
            list.iter().all(|&b| {
                self.neighbors(b as usize)
                    .binary_search(&u32::try_from(a).unwrap_or(u32::MAX))
                    .is_ok()
            })
        })
    }
}

const fn edge(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn union(mut a: HashSet<(u32, u32)>, b: HashSet<(u32, u32)>) -> HashSet<(u32, u32)> {
    if a.len() < b.len() {
        return union(b, a);
    }
    a.extend(b);
    a
}
