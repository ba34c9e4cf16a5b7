use crate::backing::entry_arena::{EntryArena, EntryId};
use crate::cache::{Clock, Timestamp};
use crate::descriptor::{
	BindingCounts, BindingDescriptor, BindingKind, BindingState, BindingUpdate, DirtyFlags, ImageBinding, SlotLayout,
};
use crate::platform::BindingPlatform;
use ash::vk::{Buffer, DescriptorPool, DescriptorSet, DescriptorSetLayout, ShaderStageFlags};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::mem::take;
use thiserror::Error;

/// How many sets a cache may hold at once if not configured otherwise.
pub const DEFAULT_MAX_SETS: u32 = 1000;

/// Configures a [`BindingSetCache`]. The lengths of the initial slot arrays fix the layout of the cache.
#[derive(Clone, Debug)]
pub struct BindingCacheCreateInfo {
	pub uniform_buffers: Vec<Buffer>,
	pub sampled_images: Vec<ImageBinding>,
	pub input_attachments: Vec<ImageBinding>,
	/// The amount of sets that may be resident at once, must be at least 1
	pub max_sets: u32,
	/// The stages uniform buffers and sampled images are visible to, input attachments are always fragment only
	pub shader_stages: ShaderStageFlags,
}

impl Default for BindingCacheCreateInfo {
	fn default() -> Self {
		Self {
			uniform_buffers: Vec::new(),
			sampled_images: Vec::new(),
			input_attachments: Vec::new(),
			max_sets: DEFAULT_MAX_SETS,
			shader_stages: ShaderStageFlags::ALL,
		}
	}
}

impl BindingCacheCreateInfo {
	/// A layout of `counts` slots, all of them initially unset.
	pub fn unset(counts: BindingCounts) -> Self {
		let state = BindingState::unset(counts);
		Self {
			uniform_buffers: state.uniform_buffers().to_vec(),
			sampled_images: state.sampled_images().to_vec(),
			input_attachments: state.input_attachments().to_vec(),
			..Self::default()
		}
	}
}

/// The set a resolve produced.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ResolvedBindingSet {
	pub set: DescriptorSet,
	/// False only if no slot changed since the previous resolve and its set is still resident, so binding it again
	/// can be skipped.
	pub newly_written: bool,
}

#[derive(Error)]
pub enum CacheCreateError<P: BindingPlatform> {
	#[error("Platform Error: {0}")]
	Platform(#[source] P::AllocationError),
}

impl<P: BindingPlatform> core::fmt::Debug for CacheCreateError<P> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		core::fmt::Display::fmt(self, f)
	}
}

#[derive(Error)]
pub enum ResolveError<P: BindingPlatform> {
	#[error("Binding set pool exhausted, all {max_sets} sets are in use")]
	PoolExhausted { max_sets: u32 },
	#[error("Platform Error: {0}")]
	Platform(#[source] P::AllocationError),
}

impl<P: BindingPlatform> core::fmt::Debug for ResolveError<P> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		core::fmt::Display::fmt(self, f)
	}
}

struct CacheEntry {
	set: DescriptorSet,
	last_used: Timestamp,
}

/// Caches binding sets of a single layout by their content.
///
/// Slots are mutated freely without any driver calls. [`Self::resolve`] then either returns the set of the last
/// resolve if nothing changed, looks up a previously written set with exactly the same content, or allocates and
/// writes a new one. Sets stay resident until [`Self::release_unused`] evicts them or the cache is dropped.
pub struct BindingSetCache<P: BindingPlatform, C: Clock> {
	platform: P,
	clock: C,
	slot_layout: SlotLayout,
	max_sets: u32,
	layout: DescriptorSetLayout,
	pool: DescriptorPool,
	lookup: FxHashMap<BindingState, EntryId>,
	entries: EntryArena<CacheEntry>,
	state: BindingState,
	current: Option<EntryId>,
	dirty: DirtyFlags,
	update_scratch: Vec<BindingUpdate>,
}

impl<P: BindingPlatform, C: Clock> BindingSetCache<P, C> {
	/// Creates the layout and the pool of the cache.
	///
	/// # Panics
	/// If `max_sets` is 0 or the layout has no slots at all.
	///
	/// # Safety
	/// The device behind `platform` must outlive the cache. Every resource bound to a slot must be alive whenever a
	/// resolve may write it into a new set, and sets must not be in use by the device while they are evicted or the
	/// cache is dropped.
	pub unsafe fn new(platform: P, clock: C, create_info: BindingCacheCreateInfo) -> Result<Self, CacheCreateError<P>> {
		unsafe {
			let state = BindingState::new(
				create_info.uniform_buffers,
				create_info.sampled_images,
				create_info.input_attachments,
			);
			let slot_layout = SlotLayout::new(state.counts(), create_info.shader_stages);
			let pool_sizes = slot_layout.pool_sizes(create_info.max_sets);

			let layout = platform
				.create_set_layout(&slot_layout.slot_descriptions())
				.map_err(CacheCreateError::Platform)?;
			let pool = match platform.create_pool(&pool_sizes) {
				Ok(pool) => pool,
				Err(err) => {
					platform.destroy_set_layout(layout);
					return Err(CacheCreateError::Platform(err));
				}
			};
			log::debug!(
				"Created binding set cache with {:?} slots and room for {} sets",
				slot_layout.counts(),
				create_info.max_sets
			);

			Ok(Self {
				platform,
				clock,
				slot_layout,
				max_sets: create_info.max_sets,
				layout,
				pool,
				lookup: FxHashMap::default(),
				entries: EntryArena::new(),
				state,
				current: None,
				dirty: DirtyFlags::all(),
				update_scratch: Vec::new(),
			})
		}
	}

	pub fn platform(&self) -> &P {
		&self.platform
	}

	pub fn clock(&self) -> &C {
		&self.clock
	}

	/// The layout every set of this cache is allocated with, to be used for pipeline layout creation.
	pub fn layout(&self) -> DescriptorSetLayout {
		self.layout
	}

	pub fn slot_layout(&self) -> &SlotLayout {
		&self.slot_layout
	}

	pub fn counts(&self) -> BindingCounts {
		self.slot_layout.counts()
	}

	pub fn max_sets(&self) -> u32 {
		self.max_sets
	}

	/// The amount of resident sets.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The slot contents the next resolve will produce a set for.
	pub fn current_state(&self) -> &BindingState {
		&self.state
	}

	/// The kinds of slots changed since the last resolve.
	pub fn dirty_flags(&self) -> DirtyFlags {
		self.dirty
	}

	#[inline]
	fn mark_dirty(&mut self, kind: BindingKind, changed: bool) {
		if changed {
			self.dirty |= DirtyFlags::from(kind);
		}
	}

	/// Binds `buffer` to the uniform buffer slot at `binding`.
	///
	/// # Panics
	/// If `binding` is not a uniform buffer slot.
	#[inline]
	pub fn set_uniform_buffer(&mut self, binding: u32, buffer: Buffer) {
		let index = self.slot_layout.slot_index(BindingKind::UniformBuffer, binding);
		let changed = self.state.set_uniform_buffer(index, buffer);
		self.mark_dirty(BindingKind::UniformBuffer, changed);
	}

	/// Binds `image` to the sampled image slot at `binding`.
	///
	/// # Panics
	/// If `binding` is not a sampled image slot.
	#[inline]
	pub fn set_image_binding(&mut self, binding: u32, image: ImageBinding) {
		let index = self.slot_layout.slot_index(BindingKind::SampledImage, binding);
		let changed = self.state.set_sampled_image(index, image);
		self.mark_dirty(BindingKind::SampledImage, changed);
	}

	/// Binds `image` to the input attachment slot at `binding`.
	///
	/// # Panics
	/// If `binding` is not an input attachment slot.
	#[inline]
	pub fn set_input_attachment(&mut self, binding: u32, image: ImageBinding) {
		let index = self.slot_layout.slot_index(BindingKind::InputAttachment, binding);
		let changed = self.state.set_input_attachment(index, image);
		self.mark_dirty(BindingKind::InputAttachment, changed);
	}

	/// Binds `descriptor` to the slot at `binding`, which must be of the same kind as the descriptor.
	pub fn set(&mut self, binding: u32, descriptor: BindingDescriptor) {
		match descriptor {
			BindingDescriptor::UniformBuffer(buffer) => self.set_uniform_buffer(binding, buffer),
			BindingDescriptor::SampledImage(image) => self.set_image_binding(binding, image),
			BindingDescriptor::InputAttachment(image) => self.set_input_attachment(binding, image),
		}
	}

	/// Unsets every uniform buffer slot bound to `buffer`, returns the amount of slots cleared.
	pub fn unset_uniform_buffer(&mut self, buffer: Buffer) -> usize {
		let cleared = self.state.unset_uniform_buffer(buffer);
		self.mark_dirty(BindingKind::UniformBuffer, cleared > 0);
		cleared
	}

	/// Unsets every sampled image slot bound to `image`, returns the amount of slots cleared.
	pub fn unset_image_binding(&mut self, image: ImageBinding) -> usize {
		let cleared = self.state.unset_sampled_image(image);
		self.mark_dirty(BindingKind::SampledImage, cleared > 0);
		cleared
	}

	/// Unsets every input attachment slot bound to `image`, returns the amount of slots cleared.
	pub fn unset_input_attachment(&mut self, image: ImageBinding) -> usize {
		let cleared = self.state.unset_input_attachment(image);
		self.mark_dirty(BindingKind::InputAttachment, cleared > 0);
		cleared
	}

	pub fn unset_all(&mut self) {
		self.dirty |= self.state.unset_all();
	}

	/// Shorthand for `self.resolve().set`.
	pub fn resolve_set(&mut self) -> DescriptorSet {
		self.resolve().set
	}

	/// Returns a set matching the current slots, writing a new one if no resident set matches.
	///
	/// # Panics
	/// If a new set is required but the pool is exhausted or allocation fails, see [`Self::try_resolve`].
	pub fn resolve(&mut self) -> ResolvedBindingSet {
		match self.try_resolve() {
			Ok(resolved) => resolved,
			Err(err) => resolve_failed(err),
		}
	}

	/// Like [`Self::resolve`], but instead of writing a new set its updates are written into `updates`, which is
	/// cleared first. The caller must apply them before using the set.
	pub fn resolve_deferred(&mut self, updates: &mut Vec<BindingUpdate>) -> ResolvedBindingSet {
		match self.try_resolve_deferred(updates) {
			Ok(resolved) => resolved,
			Err(err) => resolve_failed(err),
		}
	}

	pub fn try_resolve(&mut self) -> Result<ResolvedBindingSet, ResolveError<P>> {
		profiling::function_scope!();
		let mut updates = take(&mut self.update_scratch);
		updates.clear();
		let result = self.resolve_into(&mut updates);
		if !updates.is_empty() {
			// Safety: sets were just allocated by us, resources are the caller's responsibility
			unsafe { self.platform.apply_updates(&updates) };
			updates.clear();
		}
		self.update_scratch = updates;
		result
	}

	pub fn try_resolve_deferred(
		&mut self,
		updates: &mut Vec<BindingUpdate>,
	) -> Result<ResolvedBindingSet, ResolveError<P>> {
		profiling::function_scope!();
		updates.clear();
		self.resolve_into(updates)
	}

	fn resolve_into(&mut self, updates: &mut Vec<BindingUpdate>) -> Result<ResolvedBindingSet, ResolveError<P>> {
		let now = self.clock.now();
		if self.dirty.is_empty() {
			if let Some(entry) = self.current.and_then(|id| self.entries.get_mut(id)) {
				entry.last_used = now;
				return Ok(ResolvedBindingSet {
					set: entry.set,
					newly_written: false,
				});
			}
		}

		if let Some(&id) = self.lookup.get(&self.state) {
			let Some(entry) = self.entries.get_mut(id) else {
				unreachable!("lookup references a released entry {:?}", id)
			};
			entry.last_used = now;
			log::trace!("Binding set cache hit {:?}", entry.set);
			let set = entry.set;
			self.current = Some(id);
			self.dirty = DirtyFlags::empty();
			return Ok(ResolvedBindingSet {
				set,
				newly_written: true,
			});
		}

		if self.entries.len() >= self.max_sets as usize {
			return Err(ResolveError::PoolExhausted {
				max_sets: self.max_sets,
			});
		}
		// Safety: pool and layout are ours and alive until drop
		let set = unsafe { self.platform.allocate_set(self.pool, self.layout) }.map_err(ResolveError::Platform)?;
		self.state.write_updates(set, updates);
		let id = self.entries.insert(CacheEntry { set, last_used: now });
		match self.lookup.entry(self.state.clone()) {
			Entry::Occupied(_) => duplicate_state(&self.state),
			Entry::Vacant(vacant) => {
				vacant.insert(id);
			}
		}
		log::debug!(
			"Allocated {:?} with {} bindings, {} of {} sets in use",
			set,
			updates.len(),
			self.entries.len(),
			self.max_sets
		);
		self.current = Some(id);
		self.dirty = DirtyFlags::empty();
		Ok(ResolvedBindingSet {
			set,
			newly_written: true,
		})
	}

	/// Frees every set that was last resolved more than `max_age` ago, as measured by the clock of this cache.
	/// Returns the amount of sets freed.
	///
	/// The set of the last resolve may be freed as well, the next resolve then looks up or writes a set again.
	pub fn release_unused(&mut self, max_age: Timestamp) -> usize {
		profiling::function_scope!();
		let cutoff = self.clock.now().saturating_sub(max_age);
		let platform = &self.platform;
		let pool = self.pool;
		let entries = &mut self.entries;
		let current = self.current;
		let mut released = 0;
		let mut current_released = false;
		self.lookup.retain(|_, id| {
			let expired = entries.get(*id).is_some_and(|entry| entry.last_used < cutoff);
			if expired {
				if let Some(entry) = entries.remove(*id) {
					// Safety: the set was allocated from our pool, device usage is the caller's responsibility
					unsafe { platform.free_set(pool, entry.set) };
				}
				released += 1;
				current_released |= current == Some(*id);
			}
			!expired
		});
		if current_released {
			self.forget_current();
		}
		if released > 0 {
			log::debug!(
				"Released {} binding sets unused since {}, {} remain",
				released,
				cutoff,
				self.entries.len()
			);
		}
		released
	}

	/// Frees every set regardless of age.
	pub fn clear(&mut self) {
		profiling::function_scope!();
		self.lookup.clear();
		self.free_all();
		self.forget_current();
	}

	fn forget_current(&mut self) {
		self.current = None;
		self.dirty = DirtyFlags::all();
	}

	fn free_all(&mut self) {
		for entry in self.entries.drain() {
			// Safety: the set was allocated from our pool, device usage is the caller's responsibility
			unsafe { self.platform.free_set(self.pool, entry.set) };
		}
	}
}

impl<P: BindingPlatform, C: Clock> Drop for BindingSetCache<P, C> {
	fn drop(&mut self) {
		profiling::function_scope!();
		self.free_all();
		// Safety: all sets were freed and nothing allocates from the pool or layout anymore
		unsafe {
			self.platform.destroy_pool(self.pool);
			self.platform.destroy_set_layout(self.layout);
		}
	}
}

#[cold]
#[inline(never)]
fn resolve_failed<P: BindingPlatform>(err: ResolveError<P>) -> ! {
	log::error!("Failed to resolve binding set: {}", err);
	panic!("Failed to resolve binding set: {}", err)
}

#[cold]
#[inline(never)]
fn duplicate_state(state: &BindingState) -> ! {
	log::error!("Binding state inserted twice: {:?}", state);
	panic!("Binding state inserted twice: {:?}", state)
}
