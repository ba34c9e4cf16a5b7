//! A [`BindingPlatform`] without a device. Handles are plain counters, pools enforce their capacity and every call
//! is recorded, so binding logic can be run and inspected on the CPU alone.

use crate::descriptor::{BindingUpdate, PoolSizes, SlotDescription};
use crate::platform::BindingPlatform;
use ash::vk::{DescriptorPool, DescriptorSet, DescriptorSetLayout, Handle};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use static_assertions::assert_impl_all;
use std::mem::take;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone, Default)]
pub struct Headless(Arc<Mutex<HeadlessState>>);
assert_impl_all!(Headless: Send, Sync);

/// Counters of every call made to a [`Headless`] platform.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct HeadlessStats {
	pub layouts_created: usize,
	pub layouts_destroyed: usize,
	pub pools_created: usize,
	pub pools_destroyed: usize,
	pub sets_allocated: usize,
	pub sets_freed: usize,
	pub update_batches: usize,
	pub updates_applied: usize,
}

#[derive(Default)]
struct HeadlessState {
	next_handle: u64,
	layouts: FxHashMap<DescriptorSetLayout, Vec<SlotDescription>>,
	pools: FxHashMap<DescriptorPool, HeadlessPool>,
	applied: Vec<BindingUpdate>,
	stats: HeadlessStats,
}

struct HeadlessPool {
	sizes: PoolSizes,
	/// live sets and the layout they were allocated with
	sets: FxHashMap<DescriptorSet, DescriptorSetLayout>,
}

impl HeadlessState {
	fn next_handle<H: Handle>(&mut self) -> H {
		self.next_handle += 1;
		H::from_raw(self.next_handle)
	}

	fn layout_of(&self, set: DescriptorSet) -> Option<DescriptorSetLayout> {
		self.pools.values().find_map(|pool| pool.sets.get(&set).copied())
	}
}

#[derive(Error)]
pub enum HeadlessError {
	#[error("Pool exhausted, all {max_sets} sets are allocated")]
	PoolExhausted { max_sets: u32 },
	#[error("Unknown pool {0:?}")]
	UnknownPool(DescriptorPool),
	#[error("Unknown set layout {0:?}")]
	UnknownLayout(DescriptorSetLayout),
}

impl core::fmt::Debug for HeadlessError {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		core::fmt::Display::fmt(self, f)
	}
}

impl Headless {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn stats(&self) -> HeadlessStats {
		self.0.lock().stats
	}

	/// Number of sets currently allocated across all pools.
	pub fn live_sets(&self) -> usize {
		self.0.lock().pools.values().map(|pool| pool.sets.len()).sum()
	}

	pub fn is_live_set(&self, set: DescriptorSet) -> bool {
		self.0.lock().layout_of(set).is_some()
	}

	pub fn live_pools(&self) -> usize {
		self.0.lock().pools.len()
	}

	pub fn live_layouts(&self) -> usize {
		self.0.lock().layouts.len()
	}

	pub fn layout_slots(&self, layout: DescriptorSetLayout) -> Option<Vec<SlotDescription>> {
		self.0.lock().layouts.get(&layout).cloned()
	}

	pub fn pool_sizes(&self, pool: DescriptorPool) -> Option<PoolSizes> {
		self.0.lock().pools.get(&pool).map(|pool| pool.sizes)
	}

	/// Takes all updates applied since the last call, in the order they were applied.
	pub fn take_applied_updates(&self) -> Vec<BindingUpdate> {
		take(&mut self.0.lock().applied)
	}
}

unsafe impl BindingPlatform for Headless {
	type AllocationError = HeadlessError;

	unsafe fn create_set_layout(&self, slots: &[SlotDescription]) -> Result<DescriptorSetLayout, Self::AllocationError> {
		let mut state = self.0.lock();
		let layout = state.next_handle();
		state.layouts.insert(layout, slots.to_vec());
		state.stats.layouts_created += 1;
		Ok(layout)
	}

	unsafe fn create_pool(&self, sizes: &PoolSizes) -> Result<DescriptorPool, Self::AllocationError> {
		let mut state = self.0.lock();
		let pool = state.next_handle();
		state.pools.insert(
			pool,
			HeadlessPool {
				sizes: *sizes,
				sets: FxHashMap::default(),
			},
		);
		state.stats.pools_created += 1;
		Ok(pool)
	}

	unsafe fn allocate_set(
		&self,
		pool: DescriptorPool,
		layout: DescriptorSetLayout,
	) -> Result<DescriptorSet, Self::AllocationError> {
		let mut state = self.0.lock();
		if !state.layouts.contains_key(&layout) {
			return Err(HeadlessError::UnknownLayout(layout));
		}
		let set = state.next_handle();
		let headless_pool = state.pools.get_mut(&pool).ok_or(HeadlessError::UnknownPool(pool))?;
		let max_sets = headless_pool.sizes.max_sets;
		if headless_pool.sets.len() >= max_sets as usize {
			return Err(HeadlessError::PoolExhausted { max_sets });
		}
		headless_pool.sets.insert(set, layout);
		state.stats.sets_allocated += 1;
		Ok(set)
	}

	unsafe fn free_set(&self, pool: DescriptorPool, set: DescriptorSet) {
		let mut state = self.0.lock();
		let removed = state
			.pools
			.get_mut(&pool)
			.and_then(|headless_pool| headless_pool.sets.remove(&set));
		assert!(removed.is_some(), "{:?} was not allocated from {:?}", set, pool);
		state.stats.sets_freed += 1;
	}

	unsafe fn destroy_pool(&self, pool: DescriptorPool) {
		let mut state = self.0.lock();
		let headless_pool = state.pools.remove(&pool);
		assert!(headless_pool.is_some(), "Unknown pool {:?}", pool);
		state.stats.pools_destroyed += 1;
	}

	unsafe fn destroy_set_layout(&self, layout: DescriptorSetLayout) {
		let mut state = self.0.lock();
		let slots = state.layouts.remove(&layout);
		assert!(slots.is_some(), "Unknown set layout {:?}", layout);
		state.stats.layouts_destroyed += 1;
	}

	unsafe fn apply_updates(&self, updates: &[BindingUpdate]) {
		let mut state = self.0.lock();
		for update in updates {
			let layout = state
				.layout_of(update.set)
				.unwrap_or_else(|| panic!("Update to dead set {:?}", update.set));
			let slot = state.layouts[&layout]
				.iter()
				.find(|slot| slot.binding == update.binding)
				.unwrap_or_else(|| panic!("{:?} has no binding {}", layout, update.binding));
			assert_eq!(
				slot.kind,
				update.descriptor.kind(),
				"binding {} written with the wrong kind",
				update.binding
			);
			assert!(!update.descriptor.is_unset(), "binding {} written as unset", update.binding);
		}
		state.applied.extend_from_slice(updates);
		state.stats.update_batches += 1;
		state.stats.updates_applied += updates.len();
	}
}
