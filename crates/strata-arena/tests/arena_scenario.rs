//! Integration test: end-to-end generational arena scenario.
//!
//! Fills 256 slots, frees every even index, refills 64 and checks that
//! reuse is lowest-first, stale handles stay dead, and iteration sees
//! exactly the live set.

use strata_arena::{Arena, ArenaConfig, Handle, OsMemory};

#[test]
fn remove_evens_then_refill_lowest_first() {
    let mut arena: Arena<u32> = Arena::with_config(ArenaConfig::new(1024), OsMemory).unwrap();
    let handles: Vec<Handle> = (0..256).map(|n| arena.insert(n).unwrap()).collect();
    for (i, h) in handles.iter().enumerate() {
        assert_eq!(h.index() as usize, i);
        assert_eq!(h.generation(), 0);
    }

    for h in handles.iter().step_by(2) {
        assert_eq!(arena.remove(*h), Some(h.index()));
    }
    assert_eq!(arena.len(), 128);

    let refilled: Vec<Handle> = (0..64).map(|n| arena.insert(1000 + n).unwrap()).collect();
    for (k, h) in refilled.iter().enumerate() {
        assert_eq!(h.index() as usize, 2 * k);
        assert_eq!(h.generation(), 1);
        assert!(arena.get(handles[2 * k]).is_none());
        assert_eq!(arena[*h], 1000 + k as u32);
    }

    let live: Vec<u32> = arena.iter().map(|(h, _)| h.index()).collect();
    assert_eq!(live.len(), 256 - 128 + 64);
    assert!(live.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(arena.tracker().element_num(), 256);

    // Next insert still reuses a free even slot before growing.
    assert_eq!(arena.insert(0).unwrap().index(), 128);
}

#[test]
fn cursor_sweep_removes_matching_values() {
    let mut arena: Arena<u32> = Arena::new().unwrap();
    for n in 0..500 {
        arena.insert(n).unwrap();
    }
    let mut cursor = arena.cursor();
    while let Some(index) = cursor.advance(arena.tracker()) {
        let Some(handle) = arena.handle_at(index) else {
            continue;
        };
        if arena[handle] % 3 != 0 {
            arena.remove(handle);
        }
    }
    assert_eq!(arena.len(), 167);
    assert!(arena.iter().all(|(_, v)| v % 3 == 0));
    assert!((arena.utilization() - 167.0 / 500.0).abs() < 1e-12);
}

#[test]
fn generations_keep_climbing_on_one_slot() {
    let mut arena = Arena::with_config(ArenaConfig::new(1), OsMemory).unwrap();
    let mut last = arena.insert(()).unwrap();
    for round in 1..=100 {
        arena.remove(last);
        let next = arena.insert(()).unwrap();
        assert_eq!(next.index(), 0);
        assert_eq!(next.generation(), round);
        assert!(!arena.contains(last));
        last = next;
    }
}
