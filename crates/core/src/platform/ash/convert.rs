use crate::descriptor::{BindingKind, ImageBinding, PoolSizes, SlotDescription};
use ash::vk::{DescriptorImageInfo, DescriptorPoolSize, DescriptorSetLayoutBinding, DescriptorType};
use smallvec::SmallVec;

impl BindingKind {
	pub fn to_ash_descriptor_type(&self) -> DescriptorType {
		match self {
			BindingKind::UniformBuffer => DescriptorType::UNIFORM_BUFFER,
			BindingKind::SampledImage => DescriptorType::COMBINED_IMAGE_SAMPLER,
			BindingKind::InputAttachment => DescriptorType::INPUT_ATTACHMENT,
		}
	}
}

impl SlotDescription {
	pub fn to_ash_layout_binding(&self) -> DescriptorSetLayoutBinding<'static> {
		DescriptorSetLayoutBinding::default()
			.binding(self.binding)
			.descriptor_type(self.kind.to_ash_descriptor_type())
			.descriptor_count(1)
			.stage_flags(self.stages)
	}
}

impl ImageBinding {
	pub fn to_ash_image_info(&self) -> DescriptorImageInfo {
		DescriptorImageInfo {
			sampler: self.sampler,
			image_view: self.image_view,
			image_layout: self.image_layout,
		}
	}
}

impl PoolSizes {
	/// One [`DescriptorPoolSize`] per kind with a non-zero count, kinds without slots are left out.
	pub fn to_ash_pool_sizes(&self) -> SmallVec<[DescriptorPoolSize; 3]> {
		let descriptors = self.descriptors;
		BindingKind::VALUES
			.into_iter()
			.filter(|kind| descriptors.get(*kind) > 0)
			.map(|kind| DescriptorPoolSize {
				ty: kind.to_ash_descriptor_type(),
				descriptor_count: descriptors.get(kind),
			})
			.collect()
	}
}
