#![cfg(test)]

use crate::buffer;
use binding_set_cache::cache::{BindingCacheCreateInfo, BindingSetCache, FrameClock};
use binding_set_cache::descriptor::{BindingCounts, DirtyFlags};
use binding_set_cache::platform::headless::Headless;
use binding_set_cache::platform::BindingPlatform;
use std::sync::Arc;

#[test]
fn test_eviction_boundary_headless() -> anyhow::Result<()> {
	let headless = Headless::new();
	test_eviction_boundary(headless.clone())?;
	assert_eq!(headless.stats().sets_allocated, 4);
	assert_eq!(headless.live_sets(), 0);
	Ok(())
}

/// Entries used at frames 1, 2 and 3 are swept with a cutoff between the first two.
fn test_eviction_boundary<P: BindingPlatform>(platform: P) -> anyhow::Result<()> {
	let clock = Arc::new(FrameClock::new());
	let mut cache = unsafe {
		BindingSetCache::new(
			platform,
			clock.clone(),
			BindingCacheCreateInfo::unset(BindingCounts::new(1, 0, 0)),
		)?
	};

	let mut sets = Vec::new();
	for raw in 1..=3 {
		clock.advance();
		cache.set_uniform_buffer(0, buffer(raw));
		sets.push(cache.resolve().set);
	}

	clock.advance();
	// now = 4, cutoff = 2: only the entry of frame 1 is older
	assert_eq!(cache.release_unused(2), 1);
	assert_eq!(cache.len(), 2);
	// sweeping again with the same age finds nothing new
	assert_eq!(cache.release_unused(2), 0);

	for raw in [2, 3] {
		cache.set_uniform_buffer(0, buffer(raw));
		assert_eq!(cache.resolve().set, sets[raw as usize - 1]);
	}
	assert_eq!(cache.len(), 2);

	cache.set_uniform_buffer(0, buffer(1));
	cache.resolve();
	assert_eq!(cache.len(), 3);
	Ok(())
}

#[test]
fn test_evict_current_headless() -> anyhow::Result<()> {
	let headless = Headless::new();
	let clock = Arc::new(FrameClock::new());
	let mut cache = unsafe {
		BindingSetCache::new(
			headless.clone(),
			clock.clone(),
			BindingCacheCreateInfo::unset(BindingCounts::new(1, 0, 0)),
		)?
	};

	cache.set_uniform_buffer(0, buffer(7));
	let old = cache.resolve();
	clock.set(100);
	assert_eq!(cache.release_unused(10), 1);
	assert_eq!(cache.dirty_flags(), DirtyFlags::all());
	assert!(!headless.is_live_set(old.set));

	let new = cache.resolve();
	assert!(new.newly_written);
	assert!(headless.is_live_set(new.set));
	assert_eq!(headless.stats().sets_allocated, 2);
	assert_eq!(headless.stats().sets_freed, 1);
	Ok(())
}
