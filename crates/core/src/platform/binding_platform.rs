use crate::descriptor::{BindingUpdate, PoolSizes, SlotDescription};
use ash::vk::{DescriptorPool, DescriptorSet, DescriptorSetLayout};
use std::error::Error;

/// Internal interface for the driver calls a [`BindingSetCache`] makes, may change at any time!
///
/// # Safety
/// Implementations must return handles that stay valid until they are passed back to the matching free or destroy
/// method, and must tolerate being handed only handles they created themselves.
///
/// [`BindingSetCache`]: crate::cache::BindingSetCache
pub unsafe trait BindingPlatform: Sized + 'static {
	type AllocationError: 'static + Error + Send + Sync;

	/// Create a binding set layout with one binding per slot.
	unsafe fn create_set_layout(&self, slots: &[SlotDescription]) -> Result<DescriptorSetLayout, Self::AllocationError>;

	/// Create a pool able to hold [`PoolSizes::max_sets`] sets, each set may be freed individually.
	unsafe fn create_pool(&self, sizes: &PoolSizes) -> Result<DescriptorPool, Self::AllocationError>;

	/// Allocate a single set of `layout` from `pool`. Fails if the pool is exhausted.
	unsafe fn allocate_set(
		&self,
		pool: DescriptorPool,
		layout: DescriptorSetLayout,
	) -> Result<DescriptorSet, Self::AllocationError>;

	/// Return `set` to `pool`.
	///
	/// # Safety
	/// `set` must have been allocated from `pool` and must not be in use by the device.
	unsafe fn free_set(&self, pool: DescriptorPool, set: DescriptorSet);

	/// # Safety
	/// All sets allocated from `pool` must have been freed.
	unsafe fn destroy_pool(&self, pool: DescriptorPool);

	/// # Safety
	/// `layout` must not be used for any further allocations.
	unsafe fn destroy_set_layout(&self, layout: DescriptorSetLayout);

	/// Write `updates` into their sets.
	///
	/// # Safety
	/// Every referenced set must be alive and not in use by the device. Every referenced resource must be alive.
	unsafe fn apply_updates(&self, updates: &[BindingUpdate]);
}
