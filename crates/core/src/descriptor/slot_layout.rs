use crate::descriptor::{BindingCounts, BindingKind};
use ash::vk::ShaderStageFlags;
use std::ops::Range;

/// One slot of a binding set layout, as handed to [`BindingPlatform::create_set_layout`].
///
/// [`BindingPlatform::create_set_layout`]: crate::platform::BindingPlatform::create_set_layout
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SlotDescription {
	pub binding: u32,
	pub kind: BindingKind,
	pub stages: ShaderStageFlags,
}

/// The per-kind capacity of a pool, as handed to [`BindingPlatform::create_pool`].
///
/// [`BindingPlatform::create_pool`]: crate::platform::BindingPlatform::create_pool
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PoolSizes {
	pub max_sets: u32,
	pub descriptors: BindingCounts,
}

/// The fixed layout of slots. Binding indices are assigned uniform buffers first, then sampled images, then input
/// attachments, so each kind owns a contiguous sub-range of the binding index space.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlotLayout {
	counts: BindingCounts,
	shader_stages: ShaderStageFlags,
}

impl SlotLayout {
	pub fn new(counts: BindingCounts, shader_stages: ShaderStageFlags) -> Self {
		Self { counts, shader_stages }
	}

	#[inline]
	pub fn counts(&self) -> BindingCounts {
		self.counts
	}

	#[inline]
	pub fn binding_count(&self) -> u32 {
		self.counts.total()
	}

	pub fn range(&self, kind: BindingKind) -> Range<u32> {
		let BindingCounts {
			uniform_buffers,
			sampled_images,
			input_attachments,
		} = self.counts;
		match kind {
			BindingKind::UniformBuffer => 0..uniform_buffers,
			BindingKind::SampledImage => uniform_buffers..uniform_buffers + sampled_images,
			BindingKind::InputAttachment => {
				let start = uniform_buffers + sampled_images;
				start..start + input_attachments
			}
		}
	}

	pub fn kind_of(&self, binding: u32) -> Option<BindingKind> {
		BindingKind::VALUES
			.into_iter()
			.find(|kind| self.range(*kind).contains(&binding))
	}

	/// Translates a binding index to the position within its kind's slots, panicking if `binding` is not a slot
	/// of `kind`. Slot indices out of range are a programming error, there is nothing sensible to recover to.
	#[inline]
	pub fn slot_index(&self, kind: BindingKind, binding: u32) -> usize {
		let range = self.range(kind);
		if !range.contains(&binding) {
			Self::slot_out_of_range(kind, binding, range);
		}
		(binding - range.start) as usize
	}

	#[cold]
	#[inline(never)]
	fn slot_out_of_range(kind: BindingKind, binding: u32, range: Range<u32>) -> ! {
		log::error!("{:?} binding {} out of range {:?}", kind, binding, range);
		panic!("{:?} binding {} out of range {:?}", kind, binding, range);
	}

	pub fn stages(&self, kind: BindingKind) -> ShaderStageFlags {
		match kind {
			BindingKind::UniformBuffer | BindingKind::SampledImage => self.shader_stages,
			BindingKind::InputAttachment => ShaderStageFlags::FRAGMENT,
		}
	}

	pub fn slot_descriptions(&self) -> Vec<SlotDescription> {
		BindingKind::VALUES
			.into_iter()
			.flat_map(|kind| {
				let stages = self.stages(kind);
				self.range(kind).map(move |binding| SlotDescription { binding, kind, stages })
			})
			.collect()
	}

	/// Pool capacity for `max_sets` sets of this layout. Panics if the pool would not be able to hold a single
	/// descriptor, a layout without slots is unusable.
	pub fn pool_sizes(&self, max_sets: u32) -> PoolSizes {
		assert!(max_sets > 0, "a binding set pool must hold at least one set");
		let descriptors = self.counts.scaled(max_sets);
		assert!(
			descriptors.total() > 0,
			"a binding set layout must have at least one slot, got {:?}",
			self.counts
		);
		PoolSizes { max_sets, descriptors }
	}
}
