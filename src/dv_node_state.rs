use std::fmt;

use crate::dv_interface::{Cost, NodeId, SimTime, INFINITY};

/// Per-node routing data: direct link costs, the belief matrix and the
/// route table.
///
/// Row `my_id` of the belief matrix is this node's own distance vector; every
/// other row is the last vector reported by that node (INFINITY-filled until
/// a report arrives).
#[derive(Debug, Clone)]
pub struct NodeState {
    my_id: NodeId,
    costs: Vec<Cost>,
    belief: Vec<Vec<Cost>>,
    routes: Vec<NodeId>,
}

impl NodeState {
    pub fn new(my_id: NodeId, direct_costs: &[Cost]) -> Self {
        let n = direct_costs.len();
        assert!(n > 0, "a network needs at least one node");
        assert!(my_id < n, "node id {} out of range for {} nodes", my_id, n);

        let mut belief = vec![vec![INFINITY; n]; n];
        belief[my_id].copy_from_slice(direct_costs);

        Self {
            my_id,
            costs: direct_costs.to_vec(),
            belief,
            routes: (0..n).collect(),
        }
    }

    pub fn my_id(&self) -> NodeId {
        self.my_id
    }

    /// Number of nodes in the network
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn link_cost(&self, neighbor: NodeId) -> Cost {
        self.costs[neighbor]
    }

    pub fn link_costs(&self) -> &[Cost] {
        &self.costs
    }

    /// `from`'s believed cost to `to`
    pub fn belief(&self, from: NodeId, to: NodeId) -> Cost {
        self.belief[from][to]
    }

    pub fn belief_row(&self, from: NodeId) -> &[Cost] {
        &self.belief[from]
    }

    pub fn distance_vector(&self) -> &[Cost] {
        &self.belief[self.my_id]
    }

    pub fn next_hop(&self, dest: NodeId) -> NodeId {
        self.routes[dest]
    }

    pub fn routes(&self) -> &[NodeId] {
        &self.routes
    }

    pub(crate) fn set_link_cost(&mut self, neighbor: NodeId, cost: Cost) -> Cost {
        self.check_id(neighbor);
        std::mem::replace(&mut self.costs[neighbor], cost)
    }

    /// Replace (not merge) the row reported by `from`
    pub(crate) fn replace_belief_row(&mut self, from: NodeId, vector: &[Cost]) {
        self.check_id(from);
        assert_eq!(
            vector.len(),
            self.len(),
            "distance vector from node {} has wrong length",
            from
        );
        self.belief[from].copy_from_slice(vector);
    }

    pub(crate) fn set_route(&mut self, dest: NodeId, cost: Cost, via: NodeId) {
        self.belief[self.my_id][dest] = cost;
        self.routes[dest] = via;
    }

    fn check_id(&self, id: NodeId) {
        assert!(
            id < self.len(),
            "node id {} out of range for {} nodes",
            id,
            self.len()
        );
    }
}

/// Immutable copy of a node's tables, handed to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub my_id: NodeId,
    pub time: SimTime,
    pub link_costs: Vec<Cost>,
    pub belief: Vec<Vec<Cost>>,
    pub routes: Vec<NodeId>,
}

impl Snapshot {
    pub fn of(state: &NodeState, time: SimTime) -> Self {
        Self {
            my_id: state.my_id,
            time,
            link_costs: state.costs.clone(),
            belief: state.belief.clone(),
            routes: state.routes.clone(),
        }
    }

    pub fn distance_vector(&self) -> &[Cost] {
        &self.belief[self.my_id]
    }

    pub fn cost_to(&self, dest: NodeId) -> Cost {
        self.belief[self.my_id][dest]
    }

    /// Next hop towards `dest`; `None` for self and unreachable destinations
    pub fn next_hop(&self, dest: NodeId) -> Option<NodeId> {
        if dest == self.my_id || self.cost_to(dest) == INFINITY {
            None
        } else {
            Some(self.routes[dest])
        }
    }
}

fn fmt_cost(cost: Cost) -> String {
    if cost >= INFINITY {
        "inf".to_string()
    } else {
        cost.to_string()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.link_costs.len();
        let rule = "-".repeat(10 + 6 * n);

        writeln!(f, "Distance table of node {} at T={}", self.my_id, self.time)?;
        write!(f, "    dst  |")?;
        for dest in 0..n {
            write!(f, "{:>6}", dest)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", rule)?;
        for (from, row) in self.belief.iter().enumerate() {
            write!(f, "nbr {:>5}|", from)?;
            for cost in row {
                write!(f, "{:>6}", fmt_cost(*cost))?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        writeln!(f, "Distance vector and routes")?;
        write!(f, "  dst    |")?;
        for dest in 0..n {
            write!(f, "{:>6}", dest)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", rule)?;
        write!(f, "  cost   |")?;
        for cost in self.distance_vector() {
            write!(f, "{:>6}", fmt_cost(*cost))?;
        }
        writeln!(f)?;
        write!(f, "  route  |")?;
        for dest in 0..n {
            match self.next_hop(dest) {
                Some(via) => write!(f, "{:>6}", via)?,
                None => write!(f, "{:>6}", "-")?,
            }
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_seeds_own_row_only() {
        let state = NodeState::new(1, &[3, 0, INFINITY]);

        assert_eq!(state.len(), 3);
        assert_eq!(state.distance_vector(), &[3, 0, INFINITY]);
        assert_eq!(state.belief_row(0), &[INFINITY; 3]);
        assert_eq!(state.belief_row(2), &[INFINITY; 3]);
    }

    #[test]
    fn test_new_routes_are_identity() {
        let state = NodeState::new(0, &[0, 1, 2, 3]);
        assert_eq!(state.routes(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_replace_belief_row_overwrites() {
        let mut state = NodeState::new(0, &[0, 1, 5]);
        state.replace_belief_row(1, &[1, 0, 2]);
        state.replace_belief_row(1, &[INFINITY, 0, INFINITY]);

        assert_eq!(state.belief_row(1), &[INFINITY, 0, INFINITY]);
    }

    #[test]
    #[should_panic(expected = "wrong length")]
    fn test_replace_belief_row_rejects_short_vector() {
        let mut state = NodeState::new(0, &[0, 1, 5]);
        state.replace_belief_row(1, &[1, 0]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_new_rejects_bad_id() {
        NodeState::new(3, &[0, 1, 5]);
    }

    #[test]
    fn test_set_link_cost_returns_previous() {
        let mut state = NodeState::new(0, &[0, 1, 5]);
        assert_eq!(state.set_link_cost(2, INFINITY), 5);
        assert_eq!(state.link_cost(2), INFINITY);
        // own row is only touched by recompute
        assert_eq!(state.distance_vector(), &[0, 1, 5]);
    }

    #[test]
    fn test_snapshot_hides_routes_to_unreachable() {
        let mut state = NodeState::new(0, &[0, 1, INFINITY]);
        state.set_route(1, 1, 1);
        let snapshot = Snapshot::of(&state, 7);

        assert_eq!(snapshot.time, 7);
        assert_eq!(snapshot.next_hop(0), None);
        assert_eq!(snapshot.next_hop(1), Some(1));
        assert_eq!(snapshot.next_hop(2), None);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut state = NodeState::new(0, &[0, 1, 4]);
        let snapshot = Snapshot::of(&state, 0);
        state.set_route(2, 2, 1);

        assert_eq!(snapshot.cost_to(2), 4);
        assert_eq!(state.distance_vector()[2], 2);
    }

    #[test]
    fn test_snapshot_display() {
        let state = NodeState::new(0, &[0, 4, INFINITY]);
        let text = Snapshot::of(&state, 12).to_string();

        assert!(text.contains("node 0 at T=12"));
        assert!(text.contains("inf"));
        assert!(text.contains("  route  |     -     1     -"));
    }
}
