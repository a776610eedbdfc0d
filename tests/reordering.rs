use test_log::test;

use robdd::error::Error;
use robdd::manager::Manager;
use robdd::node::NodeId;
use robdd::types::Var;

fn v(id: u32) -> Var {
    Var::new(id)
}

fn truth_table(m: &Manager, f: NodeId) -> Vec<bool> {
    let n = m.num_vars() as usize;
    (0..1u32 << n)
        .map(|row| {
            let assignment: Vec<bool> = (0..n).map(|i| row & (1 << i) != 0).collect();
            m.evaluate(f, &assignment)
        })
        .collect()
}

// Variable identifiers of the pairs in `x1·x2 + x3·x4 + x5·x6`, interleaved so
// that the identity order is `x1, x3, x5, x2, x4, x6`.
const X1: u32 = 0;
const X3: u32 = 1;
const X5: u32 = 2;
const X2: u32 = 3;
const X4: u32 = 4;
const X6: u32 = 5;

/// `x1·x2 + x3·x4 + x5·x6` built node by node under the scrambled order.
fn scrambled_pairs(m: &Manager) -> NodeId {
    let a13 = m.create(v(X6), true, false);
    let a12 = m.create(v(X4), true, a13);
    let a11 = m.create(v(X4), true, false);
    let a10 = m.create(v(X2), true, false);
    let a9 = m.create(v(X2), true, a13);
    let a8 = m.create(v(X2), true, a11);
    let a7 = m.create(v(X2), true, a12);
    let a6 = m.create(v(X5), a13, false);
    let a5 = m.create(v(X5), a12, a11);
    let a4 = m.create(v(X5), a9, a10);
    let a3 = m.create(v(X5), a7, a8);
    let a2 = m.create(v(X3), a5, a6);
    let a1 = m.create(v(X3), a3, a4);
    m.create(v(X1), a1, a2)
}

fn pairs(a: &[bool]) -> bool {
    let x = |id: u32| a[id as usize];
    (x(X1) && x(X2)) || (x(X3) && x(X4)) || (x(X5) && x(X6))
}

#[test]
fn test_scrambled_fixture_denotes_pairs() {
    let m = Manager::new(6);
    let root = scrambled_pairs(&m);
    assert_eq!(m.get_size(root), 16);

    for row in 0..64u32 {
        let assignment: Vec<bool> = (0..6).map(|i| row & (1 << i) != 0).collect();
        assert_eq!(m.evaluate(root, &assignment), pairs(&assignment));
    }
}

#[test]
fn test_sifting_pairs_adjacent_variables() {
    let m = Manager::new(6);
    let root = scrambled_pairs(&m);
    let expected = truth_table(&m, root);

    let (root, stats) = m.sifting_with_stats(root).unwrap();
    let root = m.reduce(root);

    assert_eq!(m.get_size(root), 8);
    assert_eq!(
        m.variable_order(),
        vec![v(X1), v(X2), v(X3), v(X4), v(X5), v(X6)]
    );
    assert_eq!(truth_table(&m, root), expected);
    assert_eq!(stats.initial_size, 16);
    assert_eq!(stats.final_size, 8);
    assert_eq!(stats.best_size, 8);
    assert_eq!(stats.variables_processed, 6);

    // Nothing else survives a sweep once the result is held.
    m.reference(root);
    m.collect_garbage();
    assert_eq!(m.live_nodes(), 8);
}

#[test]
fn test_sifting_is_monotone_and_preserves_functions() {
    let m = Manager::new(6);
    let x: Vec<NodeId> = (0..6).map(|i| m.create(v(i), true, false)).collect();
    let candidates = [
        m.or(m.and(x[0], x[3]), m.and(x[1], x[4])),
        m.xor(m.and(x[0], x[5]), m.or(x[2], m.negate(x[3]))),
        m.ite(x[4], m.and(x[1], x[2]), m.xor(x[0], x[5])),
    ]
    .map(|f| m.reference(f));

    for f in candidates {
        let expected = truth_table(&m, f);
        let before = m.get_size(f);

        let g = m.sifting(f).unwrap();
        assert!(m.get_size(g) <= before);
        assert_eq!(truth_table(&m, g), expected);
        m.release(f);
    }
}

#[test]
fn test_sifting_keeps_referenced_roots_valid() {
    let m = Manager::new(4);
    let x: Vec<NodeId> = (0..4).map(|i| m.create(v(i), true, false)).collect();
    let kept = m.reference(m.or(m.and(x[0], x[2]), x[3]));
    let kept_table = truth_table(&m, kept);

    let f = m.or(m.and(x[0], x[1]), m.and(x[2], x[3]));
    let f_table = truth_table(&m, f);
    let g = m.sifting(f).unwrap();

    assert!(m.is_alive(kept));
    assert_eq!(truth_table(&m, kept), kept_table);
    assert_eq!(truth_table(&m, g), f_table);
}

#[test]
fn test_swap_contract_violations() {
    let m = Manager::new(4);
    let x: Vec<NodeId> = (0..4).map(|i| m.create(v(i), true, false)).collect();
    let f = m.reference(m.or(m.and(x[0], x[1]), m.and(x[2], x[3])));
    let expected = truth_table(&m, f);
    let size = m.get_size(f);
    let live = m.live_nodes();

    assert_eq!(m.swap(f, v(3), v(0)), Err(Error::LastVariable(v(3))));
    assert_eq!(m.swap(f, v(3), v(2)), Err(Error::LastVariable(v(3))));
    assert_eq!(m.swap(f, v(0), v(2)), Err(Error::NotAdjacent { first: v(0), second: v(2) }));
    assert_eq!(m.swap(f, v(1), v(0)), Err(Error::NotAdjacent { first: v(1), second: v(0) }));

    assert_eq!(m.variable_order(), vec![v(0), v(1), v(2), v(3)]);
    assert_eq!(m.get_size(f), size);
    assert_eq!(m.live_nodes(), live);
    assert_eq!(truth_table(&m, f), expected);
}

#[test]
fn test_swap_chain_moves_variable_to_the_bottom() {
    let m = Manager::new(4);
    let x: Vec<NodeId> = (0..4).map(|i| m.create(v(i), true, false)).collect();
    let f = m.reference(m.ite(x[0], m.xor(x[1], x[2]), m.and(x[2], x[3])));
    let expected = truth_table(&m, f);

    for next in 1..4 {
        assert_eq!(m.swap(f, v(0), v(next)).unwrap(), f);
        assert_eq!(truth_table(&m, f), expected);
    }
    assert_eq!(m.variable_order(), vec![v(1), v(2), v(3), v(0)]);
    assert_eq!(m.swap(f, v(0), v(1)), Err(Error::LastVariable(v(0))));

    // Synthesis keeps working under the new order.
    let y = m.create(v(3), true, false);
    let g = m.and(f, y);
    assert_eq!(
        truth_table(&m, g),
        expected.iter().enumerate().map(|(row, &b)| b && row & 0b1000 != 0).collect::<Vec<_>>()
    );
}
