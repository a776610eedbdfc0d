use crate::manager::Manager;
use crate::node::NodeId;

impl Manager {
    /// Evaluate `root` under a complete assignment, indexed by variable identifier.
    ///
    /// # Panics
    ///
    /// Panics if `assignment` does not cover every managed variable.
    pub fn evaluate(&self, root: NodeId, assignment: &[bool]) -> bool {
        let state = self.state.read();
        assert!(
            assignment.len() >= state.num_vars as usize,
            "Assignment covers {} of {} variables",
            assignment.len(),
            state.num_vars
        );

        let mut current = root;
        while !current.is_terminal() {
            let node = state.node(current);
            current = if assignment[node.variable.index()] { node.high } else { node.low };
        }
        current == NodeId::ONE
    }
}
