use crate::descriptor::{BindingDescriptor, BindingUpdate, PoolSizes, SlotDescription};
use crate::platform::BindingPlatform;
use ash::vk::{
	DescriptorBufferInfo, DescriptorImageInfo, DescriptorPool, DescriptorPoolCreateFlags, DescriptorPoolCreateInfo,
	DescriptorSet, DescriptorSetAllocateInfo, DescriptorSetLayout, DescriptorSetLayoutBinding,
	DescriptorSetLayoutCreateInfo, WHOLE_SIZE, WriteDescriptorSet,
};
use smallvec::SmallVec;
use static_assertions::assert_impl_all;
use std::ops::Deref;
use std::slice;
use thiserror::Error;

/// The ash platform, issuing the binding set calls directly on an [`ash::Device`].
#[derive(Clone)]
pub struct Ash {
	pub device: ash::Device,
}
assert_impl_all!(Ash: Send, Sync);

impl Ash {
	pub fn new(device: ash::Device) -> Self {
		Self { device }
	}
}

impl Deref for Ash {
	type Target = ash::Device;

	fn deref(&self) -> &Self::Target {
		&self.device
	}
}

#[derive(Error)]
pub enum AshAllocationError {
	#[error("VkResult: {0}")]
	Vk(#[from] ash::vk::Result),
}

impl core::fmt::Debug for AshAllocationError {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		core::fmt::Display::fmt(self, f)
	}
}

/// The info a single [`WriteDescriptorSet`] points to.
enum AshWriteInfo {
	Buffer(DescriptorBufferInfo),
	Image(DescriptorImageInfo),
}

impl AshWriteInfo {
	fn new(descriptor: &BindingDescriptor) -> Self {
		match descriptor {
			BindingDescriptor::UniformBuffer(buffer) => AshWriteInfo::Buffer(DescriptorBufferInfo {
				buffer: *buffer,
				offset: 0,
				range: WHOLE_SIZE,
			}),
			BindingDescriptor::SampledImage(image) | BindingDescriptor::InputAttachment(image) => {
				AshWriteInfo::Image(image.to_ash_image_info())
			}
		}
	}
}

unsafe impl BindingPlatform for Ash {
	type AllocationError = AshAllocationError;

	unsafe fn create_set_layout(&self, slots: &[SlotDescription]) -> Result<DescriptorSetLayout, Self::AllocationError> {
		unsafe {
			let bindings = slots
				.iter()
				.map(SlotDescription::to_ash_layout_binding)
				.collect::<SmallVec<[DescriptorSetLayoutBinding; 8]>>();
			Ok(self
				.device
				.create_descriptor_set_layout(&DescriptorSetLayoutCreateInfo::default().bindings(&bindings), None)?)
		}
	}

	unsafe fn create_pool(&self, sizes: &PoolSizes) -> Result<DescriptorPool, Self::AllocationError> {
		unsafe {
			let pool_sizes = sizes.to_ash_pool_sizes();
			Ok(self.device.create_descriptor_pool(
				&DescriptorPoolCreateInfo::default()
					.flags(DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
					.max_sets(sizes.max_sets)
					.pool_sizes(&pool_sizes),
				None,
			)?)
		}
	}

	unsafe fn allocate_set(
		&self,
		pool: DescriptorPool,
		layout: DescriptorSetLayout,
	) -> Result<DescriptorSet, Self::AllocationError> {
		unsafe {
			let sets = self.device.allocate_descriptor_sets(
				&DescriptorSetAllocateInfo::default()
					.descriptor_pool(pool)
					.set_layouts(&[layout]),
			)?;
			Ok(sets[0])
		}
	}

	unsafe fn free_set(&self, pool: DescriptorPool, set: DescriptorSet) {
		unsafe {
			if let Err(err) = self.device.free_descriptor_sets(pool, &[set]) {
				log::error!("Failed to free {:?} from {:?}: {}", set, pool, err);
			}
		}
	}

	unsafe fn destroy_pool(&self, pool: DescriptorPool) {
		unsafe { self.device.destroy_descriptor_pool(pool, None) }
	}

	unsafe fn destroy_set_layout(&self, layout: DescriptorSetLayout) {
		unsafe { self.device.destroy_descriptor_set_layout(layout, None) }
	}

	unsafe fn apply_updates(&self, updates: &[BindingUpdate]) {
		unsafe {
			let infos = updates
				.iter()
				.map(|update| AshWriteInfo::new(&update.descriptor))
				.collect::<SmallVec<[_; 8]>>();
			let writes = updates
				.iter()
				.zip(&infos)
				.map(|(update, info)| {
					let write = WriteDescriptorSet::default()
						.dst_set(update.set)
						.dst_binding(update.binding)
						.descriptor_type(update.descriptor.kind().to_ash_descriptor_type());
					match info {
						AshWriteInfo::Buffer(info) => write.buffer_info(slice::from_ref(info)),
						AshWriteInfo::Image(info) => write.image_info(slice::from_ref(info)),
					}
				})
				.collect::<SmallVec<[_; 8]>>();
			self.device.update_descriptor_sets(&writes, &[]);
		}
	}
}
