use crate::descriptor::BindingKind;

bitflags::bitflags! {
	/// Which kinds of slots changed since the last resolve.
	#[repr(transparent)]
	#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
	pub struct DirtyFlags: u8 {
		const UNIFORM_BUFFER = 0b1;
		const SAMPLED_IMAGE = 0b10;
		const INPUT_ATTACHMENT = 0b100;
	}
}

impl From<BindingKind> for DirtyFlags {
	fn from(value: BindingKind) -> Self {
		match value {
			BindingKind::UniformBuffer => DirtyFlags::UNIFORM_BUFFER,
			BindingKind::SampledImage => DirtyFlags::SAMPLED_IMAGE,
			BindingKind::InputAttachment => DirtyFlags::INPUT_ATTACHMENT,
		}
	}
}
