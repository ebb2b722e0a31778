use cj_utils::BiMap;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, u8),
    RemoveLeft(u8),
    RemoveRight(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..16, 0u8..16).prop_map(|(l, r)| Op::Insert(l, r)),
        1 => (0u8..16).prop_map(Op::RemoveLeft),
        1 => (0u8..16).prop_map(Op::RemoveRight),
    ]
}

fn assert_bijection(map: &BiMap<u8, u8>) {
    assert_eq!(map.lefts().len(), map.rights().len());
    for (left, right) in map.iter() {
        assert_eq!(map.get_by_right(right), Some(left));
        assert_eq!(map.get_by_left(left), Some(right));
    }
}

proptest! {
    #[test]
    fn every_step_keeps_a_bijection(ops in prop::collection::vec(op(), 0..64)) {
        let mut map = BiMap::<u8, u8>::new();
        for op in ops {
            match op {
                Op::Insert(l, r) => {
                    let collides = map.contains_left(&l) || map.contains_right(&r);
                    prop_assert_eq!(map.insert(l, r), collides);
                    prop_assert_eq!(map.get_by_left(&l), Some(&r));
                }
                Op::RemoveLeft(l) => {
                    if let Some(r) = map.remove_by_left(&l) {
                        prop_assert!(!map.contains_right(&r));
                    }
                }
                Op::RemoveRight(r) => {
                    if let Some(l) = map.remove_by_right(&r) {
                        prop_assert!(!map.contains_left(&l));
                    }
                }
            }
            assert_bijection(&map);
        }
    }

    #[test]
    fn collision_drops_the_stale_right(l in 0u8..8, r1 in 0u8..8, r2 in 8u8..16) {
        let mut map = BiMap::<u8, u8>::new();
        map.insert(l, r1);
        prop_assert!(map.insert(l, r2));
        prop_assert_eq!(map.get_by_right(&r1), None);
        prop_assert_eq!(map.get_by_left(&l), Some(&r2));
    }
}
