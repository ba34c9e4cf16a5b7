use crate::descriptor::binding::{is_unset_buffer, is_unset_input_attachment, is_unset_sampled_image};
use crate::descriptor::{BindingCounts, BindingDescriptor, BindingUpdate, DirtyFlags, ImageBinding};
use ash::vk::{Buffer, DescriptorSet};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Odd 64-bit constant (2^64 / golden ratio) used to spread the image half before mixing it with the buffer half.
const IMAGE_HALF_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// The resources bound to every slot of a layout. Used both as the mutable current state of a cache and as the
/// content key of a cached binding set.
///
/// Slot positions are part of the content: two states are only equal if every slot of every kind holds an equal
/// value. The slot counts are fixed on creation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindingState {
	uniform_buffers: Box<[Buffer]>,
	sampled_images: Box<[ImageBinding]>,
	input_attachments: Box<[ImageBinding]>,
}

impl BindingState {
	pub fn new(
		uniform_buffers: impl Into<Box<[Buffer]>>,
		sampled_images: impl Into<Box<[ImageBinding]>>,
		input_attachments: impl Into<Box<[ImageBinding]>>,
	) -> Self {
		Self {
			uniform_buffers: uniform_buffers.into(),
			sampled_images: sampled_images.into(),
			input_attachments: input_attachments.into(),
		}
	}

	/// A state with every slot unset.
	pub fn unset(counts: BindingCounts) -> Self {
		Self::new(
			vec![Buffer::null(); counts.uniform_buffers as usize],
			vec![ImageBinding::UNSET; counts.sampled_images as usize],
			vec![ImageBinding::UNSET; counts.input_attachments as usize],
		)
	}

	pub fn counts(&self) -> BindingCounts {
		BindingCounts {
			uniform_buffers: self.uniform_buffers.len() as u32,
			sampled_images: self.sampled_images.len() as u32,
			input_attachments: self.input_attachments.len() as u32,
		}
	}

	#[inline]
	pub fn uniform_buffers(&self) -> &[Buffer] {
		&self.uniform_buffers
	}

	#[inline]
	pub fn sampled_images(&self) -> &[ImageBinding] {
		&self.sampled_images
	}

	#[inline]
	pub fn input_attachments(&self) -> &[ImageBinding] {
		&self.input_attachments
	}

	/// Returns true if the slot changed.
	#[inline]
	pub fn set_uniform_buffer(&mut self, index: usize, buffer: Buffer) -> bool {
		replace_if_changed(&mut self.uniform_buffers[index], buffer)
	}

	/// Returns true if the slot changed.
	#[inline]
	pub fn set_sampled_image(&mut self, index: usize, image: ImageBinding) -> bool {
		replace_if_changed(&mut self.sampled_images[index], image)
	}

	/// Returns true if the slot changed.
	#[inline]
	pub fn set_input_attachment(&mut self, index: usize, image: ImageBinding) -> bool {
		replace_if_changed(&mut self.input_attachments[index], image)
	}

	/// Unsets every uniform buffer slot holding `buffer`, returns how many slots were cleared.
	pub fn unset_uniform_buffer(&mut self, buffer: Buffer) -> usize {
		unset_matching(&mut self.uniform_buffers, &buffer, Buffer::null())
	}

	/// Unsets every sampled image slot holding `image`, returns how many slots were cleared.
	pub fn unset_sampled_image(&mut self, image: ImageBinding) -> usize {
		unset_matching(&mut self.sampled_images, &image, ImageBinding::UNSET)
	}

	/// Unsets every input attachment slot holding `image`, returns how many slots were cleared.
	pub fn unset_input_attachment(&mut self, image: ImageBinding) -> usize {
		unset_matching(&mut self.input_attachments, &image, ImageBinding::UNSET)
	}

	/// Unsets every slot, returns the kinds that had at least one slot set to something else than the unset value.
	pub fn unset_all(&mut self) -> DirtyFlags {
		let mut changed = DirtyFlags::empty();
		if reset_all(&mut self.uniform_buffers, Buffer::null()) {
			changed |= DirtyFlags::UNIFORM_BUFFER;
		}
		if reset_all(&mut self.sampled_images, ImageBinding::UNSET) {
			changed |= DirtyFlags::SAMPLED_IMAGE;
		}
		if reset_all(&mut self.input_attachments, ImageBinding::UNSET) {
			changed |= DirtyFlags::INPUT_ATTACHMENT;
		}
		changed
	}

	/// Content hash of all slots.
	///
	/// The uniform buffers and the image kinds are hashed separately and the image half is rotated by 32 bits and
	/// multiplied by an odd constant before being xor-ed onto the buffer half. Unlike packing two 32-bit halves
	/// into one word, no bits of either half are dropped, and since the mixing is only applied to one side,
	/// swapping the contents of the two halves yields a different hash. Collisions between unequal states are only
	/// a performance concern, lookups always compare full contents.
	pub fn content_hash(&self) -> u64 {
		let mut buffers = FxHasher::default();
		self.uniform_buffers.hash(&mut buffers);

		let mut images = FxHasher::default();
		self.sampled_images.hash(&mut images);
		self.input_attachments.hash(&mut images);

		combine_halves(buffers.finish(), images.finish())
	}

	/// Iterates all slots that are set, in binding index order, skipping unset ones.
	pub fn iter_bound(&self) -> impl Iterator<Item = (u32, BindingDescriptor)> + '_ {
		let uniform_buffers = self
			.uniform_buffers
			.iter()
			.map(|buffer| BindingDescriptor::UniformBuffer(*buffer));
		let sampled_images = self
			.sampled_images
			.iter()
			.map(|image| BindingDescriptor::SampledImage(*image));
		let input_attachments = self
			.input_attachments
			.iter()
			.map(|image| BindingDescriptor::InputAttachment(*image));
		uniform_buffers
			.chain(sampled_images)
			.chain(input_attachments)
			.zip(0..)
			.filter(|(descriptor, _)| !descriptor.is_unset())
			.map(|(descriptor, binding)| (binding, descriptor))
	}

	/// Appends one [`BindingUpdate`] into `set` for every slot that is set. Unset slots are skipped, not written as
	/// null.
	pub fn write_updates(&self, set: DescriptorSet, updates: &mut Vec<BindingUpdate>) {
		updates.extend(self.iter_bound().map(|(binding, descriptor)| BindingUpdate {
			set,
			binding,
			descriptor,
		}));
	}

	pub fn bound_count(&self) -> usize {
		self.uniform_buffers.iter().filter(|b| !is_unset_buffer(**b)).count()
			+ self.sampled_images.iter().filter(|i| !is_unset_sampled_image(i)).count()
			+ self
				.input_attachments
				.iter()
				.filter(|i| !is_unset_input_attachment(i))
				.count()
	}
}

impl Hash for BindingState {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u64(self.content_hash());
	}
}

#[inline]
fn combine_halves(buffers: u64, images: u64) -> u64 {
	buffers ^ images.rotate_left(32).wrapping_mul(IMAGE_HALF_MIX)
}

#[inline]
fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
	if *slot != value {
		*slot = value;
		true
	} else {
		false
	}
}

fn unset_matching<T: PartialEq + Copy>(slots: &mut [T], value: &T, unset: T) -> usize {
	if *value == unset {
		return 0;
	}
	let mut cleared = 0;
	for slot in slots.iter_mut().filter(|slot| **slot == *value) {
		*slot = unset;
		cleared += 1;
	}
	cleared
}

fn reset_all<T: PartialEq + Copy>(slots: &mut [T], unset: T) -> bool {
	let mut changed = false;
	for slot in slots.iter_mut() {
		changed |= replace_if_changed(slot, unset);
	}
	changed
}

#[cfg(test)]
mod tests {
	use super::*;
	use ash::vk::{Handle, ImageLayout, ImageView, Sampler};
	use rustc_hash::FxHashSet;

	fn image(sampler: u64, view: u64) -> ImageBinding {
		ImageBinding::new(
			Sampler::from_raw(sampler),
			ImageView::from_raw(view),
			ImageLayout::SHADER_READ_ONLY_OPTIMAL,
		)
	}

	fn state(buffers: &[u64], images: &[ImageBinding], attachments: &[ImageBinding]) -> BindingState {
		BindingState::new(
			buffers.iter().map(|b| Buffer::from_raw(*b)).collect::<Vec<_>>(),
			images.to_vec(),
			attachments.to_vec(),
		)
	}

	#[test]
	fn test_set_reports_change() {
		let mut state = BindingState::unset(BindingCounts::new(2, 1, 0));
		assert!(state.set_uniform_buffer(0, Buffer::from_raw(1)));
		assert!(!state.set_uniform_buffer(0, Buffer::from_raw(1)));
		assert!(state.set_sampled_image(0, image(1, 2)));
		assert!(!state.set_sampled_image(0, image(1, 2)));
		assert!(state.set_sampled_image(0, image(1, 3)));
		assert_eq!(state.uniform_buffers(), &[Buffer::from_raw(1), Buffer::null()]);
	}

	#[test]
	fn test_unset_matching_clears_every_slot() {
		let mut state = state(&[5, 6, 5], &[image(1, 2), image(1, 2)], &[]);
		assert_eq!(state.unset_uniform_buffer(Buffer::from_raw(5)), 2);
		assert_eq!(state.unset_uniform_buffer(Buffer::from_raw(5)), 0);
		assert_eq!(
			state.uniform_buffers(),
			&[Buffer::null(), Buffer::from_raw(6), Buffer::null()]
		);
		assert_eq!(state.unset_sampled_image(image(1, 2)), 2);
		assert_eq!(state.bound_count(), 1);
	}

	#[test]
	fn test_unset_with_unset_value_is_noop() {
		let mut state = BindingState::unset(BindingCounts::new(2, 1, 1));
		assert_eq!(state.unset_uniform_buffer(Buffer::null()), 0);
		assert_eq!(state.unset_sampled_image(ImageBinding::UNSET), 0);
		assert_eq!(state.unset_input_attachment(ImageBinding::UNSET), 0);
	}

	#[test]
	fn test_unset_all() {
		let mut state = state(&[1, 0], &[ImageBinding::UNSET], &[image(0, 3)]);
		assert_eq!(
			state.unset_all(),
			DirtyFlags::UNIFORM_BUFFER | DirtyFlags::INPUT_ATTACHMENT
		);
		assert_eq!(state, BindingState::unset(BindingCounts::new(2, 1, 1)));
		assert_eq!(state.unset_all(), DirtyFlags::empty());
	}

	#[test]
	fn test_equality_is_positional() {
		let a = state(&[1, 2], &[image(3, 4)], &[]);
		let b = state(&[2, 1], &[image(3, 4)], &[]);
		assert_ne!(a, b);
		assert_eq!(a, a.clone());
		assert_eq!(a.content_hash(), a.clone().content_hash());
	}

	#[test]
	fn test_equality_requires_same_lengths() {
		let a = state(&[1], &[], &[]);
		let b = state(&[1, 0], &[], &[]);
		assert_ne!(a, b);
	}

	#[test]
	fn test_write_updates_skips_unset() {
		let mut state = state(&[0, 2], &[image(3, 4), image(0, 5)], &[image(0, 6), image(0, 0)]);
		let set = DescriptorSet::from_raw(99);
		let mut updates = Vec::new();
		state.write_updates(set, &mut updates);
		assert_eq!(
			updates,
			[
				BindingUpdate {
					set,
					binding: 1,
					descriptor: BindingDescriptor::UniformBuffer(Buffer::from_raw(2)),
				},
				BindingUpdate {
					set,
					binding: 2,
					descriptor: BindingDescriptor::SampledImage(image(3, 4)),
				},
				BindingUpdate {
					set,
					binding: 4,
					descriptor: BindingDescriptor::InputAttachment(image(0, 6)),
				},
			]
		);
		assert_eq!(state.bound_count(), updates.len());

		state.set_uniform_buffer(0, Buffer::from_raw(1));
		updates.clear();
		state.write_updates(set, &mut updates);
		assert_eq!(updates[0].binding, 0);
		assert_eq!(updates.len(), 4);
	}

	#[test]
	fn test_hash_distinct_over_grid() {
		let mut hashes = FxHashSet::default();
		let mut count = 0;
		for b0 in 0..16 {
			for b1 in 0..16 {
				for s in 0..8 {
					let state = state(&[b0, b1], &[image(s, 1)], &[image(0, s)]);
					hashes.insert(state.content_hash());
					count += 1;
				}
			}
		}
		assert_eq!(hashes.len(), count);
	}

	#[test]
	fn test_hash_halves_are_asymmetric() {
		for i in 1..64 {
			assert_ne!(combine_halves(i, 0), combine_halves(0, i));
			assert_ne!(combine_halves(i, i + 1), combine_halves(i + 1, i));
		}
	}

	#[test]
	fn test_hash_kinds_do_not_alias() {
		// the same handle value moved between a buffer slot and an image slot must not hash equal
		let in_buffer = state(&[7], &[image(0, 0)], &[]);
		let in_image = state(&[0], &[image(7, 0)], &[]);
		assert_ne!(in_buffer.content_hash(), in_image.content_hash());

		// the same triple moved between the sampled image and input attachment ranges
		let sampled = state(&[], &[image(1, 2), ImageBinding::UNSET], &[ImageBinding::UNSET]);
		let attachment = state(&[], &[ImageBinding::UNSET, ImageBinding::UNSET], &[image(1, 2)]);
		assert_ne!(sampled.content_hash(), attachment.content_hash());
	}
}
