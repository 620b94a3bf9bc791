use std::fmt;

use crate::dv_interface::{saturating_cost_add, Cost, NodeId, INFINITY};

/// Errors raised while building or mutating a topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// No nodes at all
    Empty,

    /// Row `row` does not have one entry per node
    NotSquare { row: usize, len: usize, expected: usize },

    /// A node has a non-zero cost to itself
    NonZeroDiagonal(NodeId),

    /// cost(a, b) != cost(b, a)
    Asymmetric { a: NodeId, b: NodeId },

    /// Cost above the INFINITY sentinel
    CostOutOfRange { a: NodeId, b: NodeId, cost: Cost },

    /// Node id outside 0..N
    UnknownNode(NodeId),

    /// Links always join two distinct nodes
    SelfLink(NodeId),
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::Empty => write!(f, "topology has no nodes"),
            TopologyError::NotSquare { row, len, expected } => write!(
                f,
                "row {} has {} entries, expected {}",
                row, len, expected
            ),
            TopologyError::NonZeroDiagonal(node) => {
                write!(f, "node {} has a non-zero cost to itself", node)
            }
            TopologyError::Asymmetric { a, b } => {
                write!(f, "link {} <-> {} has different costs per direction", a, b)
            }
            TopologyError::CostOutOfRange { a, b, cost } => write!(
                f,
                "link {} <-> {} has cost {} above {}",
                a, b, cost, INFINITY
            ),
            TopologyError::UnknownNode(node) => write!(f, "node {} does not exist", node),
            TopologyError::SelfLink(node) => write!(f, "node {} can not link to itself", node),
        }
    }
}

impl std::error::Error for TopologyError {}

/// Symmetric link-cost matrix of the simulated network.
///
/// `cost(a, b) == INFINITY` means there is no direct link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    costs: Vec<Vec<Cost>>,
}

impl Topology {
    pub fn from_matrix(costs: Vec<Vec<Cost>>) -> Result<Self, TopologyError> {
        let n = costs.len();
        if n == 0 {
            return Err(TopologyError::Empty);
        }

        for (row, entries) in costs.iter().enumerate() {
            if entries.len() != n {
                return Err(TopologyError::NotSquare {
                    row,
                    len: entries.len(),
                    expected: n,
                });
            }
        }

        for a in 0..n {
            if costs[a][a] != 0 {
                return Err(TopologyError::NonZeroDiagonal(a));
            }
            for b in (a + 1)..n {
                if costs[a][b] > INFINITY {
                    return Err(TopologyError::CostOutOfRange {
                        a,
                        b,
                        cost: costs[a][b],
                    });
                }
                if costs[a][b] != costs[b][a] {
                    return Err(TopologyError::Asymmetric { a, b });
                }
            }
        }

        Ok(Self { costs })
    }

    /// Build from a list of bidirectional links; everything else is unlinked
    pub fn from_links(n: usize, links: &[(NodeId, NodeId, Cost)]) -> Result<Self, TopologyError> {
        if n == 0 {
            return Err(TopologyError::Empty);
        }

        let mut costs = vec![vec![INFINITY; n]; n];
        for (node, row) in costs.iter_mut().enumerate() {
            row[node] = 0;
        }

        let mut topology = Self { costs };
        for (a, b, cost) in links {
            topology.set_link(*a, *b, *cost)?;
        }

        Ok(topology)
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn cost(&self, a: NodeId, b: NodeId) -> Cost {
        self.costs[a][b]
    }

    /// Direct link costs as seen from `node`
    pub fn link_costs(&self, node: NodeId) -> &[Cost] {
        &self.costs[node]
    }

    pub fn is_neighbor(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.costs[a][b] != INFINITY
    }

    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        (0..self.len())
            .filter(|other| self.is_neighbor(node, *other))
            .collect()
    }

    /// Check that `a <-> b` could carry a link, without changing anything
    pub fn check_link(&self, a: NodeId, b: NodeId, cost: Cost) -> Result<(), TopologyError> {
        for node in [a, b] {
            if node >= self.len() {
                return Err(TopologyError::UnknownNode(node));
            }
        }
        if a == b {
            return Err(TopologyError::SelfLink(a));
        }
        if cost > INFINITY {
            return Err(TopologyError::CostOutOfRange { a, b, cost });
        }
        Ok(())
    }

    /// Set the cost of the link in both directions, returning the old cost
    pub fn set_link(&mut self, a: NodeId, b: NodeId, cost: Cost) -> Result<Cost, TopologyError> {
        self.check_link(a, b, cost)?;

        let old = self.costs[a][b];
        self.costs[a][b] = cost;
        self.costs[b][a] = cost;
        Ok(old)
    }

    /// All-pairs shortest path costs (Floyd-Warshall), INFINITY when
    /// unreachable
    pub fn shortest_paths(&self) -> Vec<Vec<Cost>> {
        let n = self.len();
        let mut dist = self.costs.clone();

        for k in 0..n {
            for i in 0..n {
                if dist[i][k] == INFINITY {
                    continue;
                }
                for j in 0..n {
                    let through_k = saturating_cost_add(dist[i][k], dist[k][j]);
                    if through_k < dist[i][j] {
                        dist[i][j] = through_k;
                    }
                }
            }
        }

        dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INF: Cost = INFINITY;

    #[test]
    fn test_from_matrix_valid() {
        let topology =
            Topology::from_matrix(vec![vec![0, 1, INF], vec![1, 0, 3], vec![INF, 3, 0]]).unwrap();

        assert_eq!(topology.len(), 3);
        assert_eq!(topology.neighbors(1), vec![0, 2]);
        assert!(!topology.is_neighbor(0, 2));
        assert!(!topology.is_neighbor(1, 1));
    }

    #[test]
    fn test_from_matrix_rejects_bad_shapes() {
        assert_eq!(Topology::from_matrix(vec![]), Err(TopologyError::Empty));
        assert_eq!(
            Topology::from_matrix(vec![vec![0, 1], vec![1]]),
            Err(TopologyError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            })
        );
    }

    #[test]
    fn test_from_matrix_rejects_bad_costs() {
        assert_eq!(
            Topology::from_matrix(vec![vec![0, 1], vec![2, 0]]),
            Err(TopologyError::Asymmetric { a: 0, b: 1 })
        );
        assert_eq!(
            Topology::from_matrix(vec![vec![5, 1], vec![1, 0]]),
            Err(TopologyError::NonZeroDiagonal(0))
        );
        assert_eq!(
            Topology::from_matrix(vec![vec![0, 1000], vec![1000, 0]]),
            Err(TopologyError::CostOutOfRange {
                a: 0,
                b: 1,
                cost: 1000
            })
        );
    }

    #[test]
    fn test_set_link_is_symmetric() {
        let mut topology = Topology::from_links(3, &[(0, 1, 4)]).unwrap();

        assert_eq!(topology.set_link(1, 0, 60), Ok(4));
        assert_eq!(topology.cost(0, 1), 60);
        assert_eq!(topology.cost(1, 0), 60);

        assert_eq!(topology.set_link(0, 0, 1), Err(TopologyError::SelfLink(0)));
        assert_eq!(topology.set_link(0, 3, 1), Err(TopologyError::UnknownNode(3)));
    }

    #[test]
    fn test_shortest_paths_triangle() {
        let topology = Topology::from_links(3, &[(0, 1, 1), (1, 2, 1), (0, 2, 4)]).unwrap();
        let dist = topology.shortest_paths();

        assert_eq!(dist[0], vec![0, 1, 2]);
        assert_eq!(dist[2], vec![2, 1, 0]);
    }

    #[test]
    fn test_shortest_paths_disconnected() {
        let topology = Topology::from_links(4, &[(0, 1, 3), (2, 3, 1)]).unwrap();
        let dist = topology.shortest_paths();

        assert_eq!(dist[0][1], 3);
        assert_eq!(dist[0][2], INF);
        assert_eq!(dist[3][1], INF);
    }

    #[test]
    fn test_error_display() {
        let e = TopologyError::Asymmetric { a: 2, b: 5 };
        assert!(e.to_string().contains("2 <-> 5"));

        let e: Box<dyn std::error::Error> = Box::new(TopologyError::Empty);
        assert!(!e.to_string().is_empty());
    }
}
