//! Integration test: every mapping the allocators acquire is released
//! exactly once, and OS failures surface as errors.
//!
//! Runs the bump allocator and the slot tracker over a counting
//! `TrackingMemory` and checks acquire/release balance after `clear`,
//! `dispose` and drop.

use std::alloc::Layout;

use strata_arena::{Arena, ArenaConfig, ArenaError, BumpConfig, OsMemory, PagedBump, SlotTracker};
use strata_core::MemoryError;
use strata_test_utils::fixtures::INJECTED_ERRNO;
use strata_test_utils::TrackingMemory;

fn tracking() -> TrackingMemory<OsMemory> {
    TrackingMemory::new(OsMemory)
}

fn half_page_plus_one(bump: &PagedBump<TrackingMemory<OsMemory>>) -> Layout {
    Layout::from_size_align(bump.page_bytes() / 2 + 1, 8).unwrap()
}

// ── Bump allocator ──────────────────────────────────────────────

#[test]
fn each_oversized_half_gets_its_own_page() {
    let mem = tracking();
    let bump = PagedBump::with_config(BumpConfig::new(1), mem.clone()).unwrap();
    let layout = half_page_plus_one(&bump);
    for _ in 0..10 {
        bump.alloc_layout(layout).unwrap();
    }
    assert_eq!(bump.page_count(), 10);
    assert_eq!(mem.acquire_count(), 10);
    assert_eq!(mem.live_bytes(), 10 * bump.page_bytes());

    bump.dispose().unwrap();
    assert_eq!(mem.release_count(), 10);
    assert_eq!(mem.live_regions(), 0);
    assert_eq!(mem.live_bytes(), 0);
}

#[test]
fn small_allocations_share_pages() {
    let mem = tracking();
    let bump = PagedBump::with_config(BumpConfig::new(1), mem.clone()).unwrap();
    let per_page = bump.page_bytes() / 64;
    for _ in 0..per_page * 3 {
        bump.alloc([0u64; 8]).unwrap();
    }
    assert_eq!(mem.acquire_count(), 3);
}

#[test]
fn clear_releases_all_but_one_page() {
    let mem = tracking();
    let mut bump = PagedBump::with_config(BumpConfig::new(1), mem.clone()).unwrap();
    let layout = half_page_plus_one(&bump);
    for _ in 0..5 {
        bump.alloc_layout(layout).unwrap();
    }
    bump.clear().unwrap();
    assert_eq!(mem.release_count(), 4);
    assert_eq!(mem.live_regions(), 1);

    // The kept page is reused before anything new is mapped.
    bump.alloc_layout(layout).unwrap();
    assert_eq!(mem.acquire_count(), 5);

    drop(bump);
    assert_eq!(mem.live_regions(), 0);
}

#[test]
fn unused_allocator_never_maps() {
    let mem = tracking();
    let bump = PagedBump::with_config(BumpConfig::default(), mem.clone()).unwrap();
    bump.dispose().unwrap();
    assert_eq!(mem.acquire_count(), 0);
    assert_eq!(mem.release_count(), 0);
}

#[test]
fn failed_page_acquire_propagates_and_keeps_current_page() {
    let mem = tracking();
    let bump = PagedBump::with_config(BumpConfig::new(1), mem.clone()).unwrap();
    mem.fail_after(1);
    let layout = half_page_plus_one(&bump);
    bump.alloc_layout(layout).unwrap();

    let err = bump.alloc_layout(layout).unwrap_err();
    assert_eq!(
        err,
        ArenaError::Memory(MemoryError::MapFailed {
            size: bump.page_bytes(),
            errno: INJECTED_ERRNO,
        })
    );
    assert_eq!(bump.page_count(), 1);

    // Whatever still fits in the current page is served without mapping.
    assert_eq!(*bump.alloc(9u32).unwrap(), 9);
    drop(bump);
    assert_eq!(mem.live_regions(), 0);
}

// ── Slot tracker and arena ──────────────────────────────────────

#[test]
fn tracker_maps_two_tables_and_releases_both() {
    let mem = tracking();
    let mut tracker = SlotTracker::with_config(ArenaConfig::new(4096), mem.clone()).unwrap();
    assert_eq!(mem.acquire_count(), 2);
    for _ in 0..4096 {
        tracker.insert().unwrap();
    }
    // Growth never maps anything new.
    assert_eq!(mem.acquire_count(), 2);
    tracker.dispose().unwrap();
    assert_eq!(mem.live_regions(), 0);
}

#[test]
fn failed_generation_table_releases_bitmap() {
    let mem = tracking();
    mem.fail_after(1);
    let err = SlotTracker::with_config(ArenaConfig::default(), mem.clone()).unwrap_err();
    assert!(matches!(
        err,
        ArenaError::Memory(MemoryError::MapFailed { errno: INJECTED_ERRNO, .. })
    ));
    assert_eq!(mem.acquire_count(), 1);
    assert_eq!(mem.live_regions(), 0);
}

#[test]
fn dropping_an_arena_releases_its_tables() {
    let mem = tracking();
    {
        let mut arena = Arena::with_config(ArenaConfig::new(100), mem.clone()).unwrap();
        arena.insert(vec![1, 2, 3]).unwrap();
        assert_eq!(mem.live_regions(), 2);
    }
    assert_eq!(mem.live_regions(), 0);
    assert_eq!(mem.live_bytes(), 0);
}
