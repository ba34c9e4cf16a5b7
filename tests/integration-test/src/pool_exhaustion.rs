#![cfg(test)]

use crate::buffer;
use binding_set_cache::cache::{BindingCacheCreateInfo, BindingSetCache, FrameClock, ResolveError};
use binding_set_cache::descriptor::BindingCounts;
use binding_set_cache::platform::headless::Headless;
use binding_set_cache::platform::BindingPlatform;

fn single_set_cache<P: BindingPlatform>(platform: P) -> anyhow::Result<BindingSetCache<P, FrameClock>> {
	Ok(unsafe {
		BindingSetCache::new(
			platform,
			FrameClock::new(),
			BindingCacheCreateInfo {
				max_sets: 1,
				..BindingCacheCreateInfo::unset(BindingCounts::new(1, 0, 0))
			},
		)?
	})
}

#[test]
fn test_pool_exhaustion_headless() -> anyhow::Result<()> {
	test_pool_exhaustion(Headless::new())
}

fn test_pool_exhaustion<P: BindingPlatform>(platform: P) -> anyhow::Result<()> {
	let mut cache = single_set_cache(platform)?;
	cache.set_uniform_buffer(0, buffer(1));
	let first = cache.try_resolve()?;

	cache.set_uniform_buffer(0, buffer(2));
	match cache.try_resolve() {
		Err(ResolveError::PoolExhausted { max_sets }) => assert_eq!(max_sets, 1),
		other => panic!("expected exhaustion, got {:?}", other),
	}

	// the resident set is still usable
	cache.set_uniform_buffer(0, buffer(1));
	assert_eq!(cache.try_resolve()?.set, first.set);
	Ok(())
}

#[test]
#[should_panic(expected = "pool exhausted")]
fn test_pool_exhaustion_panics_headless() {
	let mut cache = single_set_cache(Headless::new()).unwrap();
	cache.set_uniform_buffer(0, buffer(1));
	cache.resolve();
	cache.set_uniform_buffer(0, buffer(2));
	cache.resolve();
}
