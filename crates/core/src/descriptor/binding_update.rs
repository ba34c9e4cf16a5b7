use crate::descriptor::BindingDescriptor;
use ash::vk::DescriptorSet;

/// A single slot write into a freshly allocated binding set. Uniform buffers are always bound from offset 0 with
/// their whole size.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BindingUpdate {
	pub set: DescriptorSet,
	pub binding: u32,
	pub descriptor: BindingDescriptor,
}
