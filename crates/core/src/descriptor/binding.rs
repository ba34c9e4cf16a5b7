use ash::vk::{Buffer, ImageLayout, ImageView, Sampler};

/// The kind of resource a slot of the layout is reserved for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BindingKind {
	UniformBuffer,
	SampledImage,
	InputAttachment,
}

impl BindingKind {
	pub const VALUES: [BindingKind; 3] = [
		BindingKind::UniformBuffer,
		BindingKind::SampledImage,
		BindingKind::InputAttachment,
	];
}

/// A sampler, image view and layout triple, as bound to a sampled image or input attachment slot. Two
/// `ImageBinding`s are equal if all three fields are equal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ImageBinding {
	pub sampler: Sampler,
	pub image_view: ImageView,
	pub image_layout: ImageLayout,
}

impl ImageBinding {
	pub const UNSET: Self = Self {
		sampler: Sampler::null(),
		image_view: ImageView::null(),
		image_layout: ImageLayout::UNDEFINED,
	};

	pub fn new(sampler: Sampler, image_view: ImageView, image_layout: ImageLayout) -> Self {
		Self {
			sampler,
			image_view,
			image_layout,
		}
	}

	/// An input attachment has no sampler, it is read by the fragment shader at the current pixel.
	pub fn input_attachment(image_view: ImageView, image_layout: ImageLayout) -> Self {
		Self::new(Sampler::null(), image_view, image_layout)
	}
}

impl Default for ImageBinding {
	fn default() -> Self {
		Self::UNSET
	}
}

/// A single resource bound to a slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BindingDescriptor {
	/// Unset if the buffer is null.
	UniformBuffer(Buffer),
	/// Unset if the sampler is null.
	SampledImage(ImageBinding),
	/// Unset if the image view is null.
	InputAttachment(ImageBinding),
}

impl BindingDescriptor {
	pub fn kind(&self) -> BindingKind {
		match self {
			BindingDescriptor::UniformBuffer(_) => BindingKind::UniformBuffer,
			BindingDescriptor::SampledImage(_) => BindingKind::SampledImage,
			BindingDescriptor::InputAttachment(_) => BindingKind::InputAttachment,
		}
	}

	/// Unset slots are skipped when writing a binding set, they are never written as null.
	pub fn is_unset(&self) -> bool {
		match self {
			BindingDescriptor::UniformBuffer(buffer) => is_unset_buffer(*buffer),
			BindingDescriptor::SampledImage(image) => is_unset_sampled_image(image),
			BindingDescriptor::InputAttachment(image) => is_unset_input_attachment(image),
		}
	}
}

#[inline]
pub(crate) fn is_unset_buffer(buffer: Buffer) -> bool {
	buffer == Buffer::null()
}

#[inline]
pub(crate) fn is_unset_sampled_image(image: &ImageBinding) -> bool {
	image.sampler == Sampler::null()
}

#[inline]
pub(crate) fn is_unset_input_attachment(image: &ImageBinding) -> bool {
	image.image_view == ImageView::null()
}
