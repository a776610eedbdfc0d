use std::collections::HashMap;

use num_bigint::BigUint;

use crate::manager::{Manager, State};
use crate::node::NodeId;

impl State {
    fn sat_count_rec(&self, node: NodeId, max: &BigUint, cache: &mut HashMap<NodeId, BigUint>) -> BigUint {
        if node == NodeId::ZERO {
            return BigUint::ZERO;
        } else if node == NodeId::ONE {
            return max.clone();
        }

        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let n = *self.node(node);
        let count_low = self.sat_count_rec(n.low, max, cache);
        let count_high = self.sat_count_rec(n.high, max, cache);

        // Each branch fixes one variable, so it covers half of the assignments it reaches.
        let count: BigUint = (count_low + count_high) >> 1;
        cache.insert(node, count.clone());
        count
    }
}

impl Manager {
    /// Number of assignments to all managed variables that satisfy `node`.
    pub fn sat_count(&self, node: NodeId) -> BigUint {
        let state = self.state.read();
        let max = BigUint::from(1u32) << state.num_vars as usize;
        let mut cache = HashMap::new();
        state.sat_count_rec(node, &max, &mut cache)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::Var;

    #[test]
    fn test_sat_count_terminals() {
        let m = Manager::new(5);
        assert_eq!(m.sat_count(m.zero()), BigUint::ZERO);
        assert_eq!(m.sat_count(m.one()), BigUint::from(32u32));
    }

    #[test]
    fn test_sat_count_connectives() {
        let m = Manager::new(3);
        let x = m.create(Var::new(0), true, false);
        let y = m.create(Var::new(1), true, false);
        let z = m.create(Var::new(2), true, false);

        assert_eq!(m.sat_count(x), BigUint::from(4u32));
        assert_eq!(m.sat_count(m.and(x, z)), BigUint::from(2u32));
        assert_eq!(m.sat_count(m.or(x, y)), BigUint::from(6u32));
        assert_eq!(m.sat_count(m.xor(m.xor(x, y), z)), BigUint::from(4u32));
    }

    #[test]
    fn test_sat_count_after_reorder() {
        let m = Manager::new(3);
        let x = m.create(Var::new(0), true, false);
        let z = m.create(Var::new(2), true, false);
        let f = m.reference(m.and(x, m.negate(z)));
        assert_eq!(m.sat_count(f), BigUint::from(2u32));

        m.swap(f, Var::new(0), Var::new(1)).unwrap();
        m.swap(f, Var::new(0), Var::new(2)).unwrap();
        assert_eq!(m.sat_count(f), BigUint::from(2u32));
    }

    #[test]
    fn test_sat_count_many_variables() {
        let m = Manager::new(100);
        let x = m.create(Var::new(50), true, false);
        assert_eq!(m.sat_count(x), BigUint::from(1u32) << 99);
    }
}
