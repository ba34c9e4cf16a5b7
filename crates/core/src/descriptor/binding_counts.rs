use crate::descriptor::BindingKind;

/// Number of slots per [`BindingKind`] in a layout, or the number of descriptors per kind in a pool.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BindingCounts {
	pub uniform_buffers: u32,
	pub sampled_images: u32,
	pub input_attachments: u32,
}

impl BindingCounts {
	pub const ZERO: Self = BindingCounts {
		uniform_buffers: 0,
		sampled_images: 0,
		input_attachments: 0,
	};

	pub fn new(uniform_buffers: u32, sampled_images: u32, input_attachments: u32) -> Self {
		Self {
			uniform_buffers,
			sampled_images,
			input_attachments,
		}
	}

	pub fn get(&self, kind: BindingKind) -> u32 {
		match kind {
			BindingKind::UniformBuffer => self.uniform_buffers,
			BindingKind::SampledImage => self.sampled_images,
			BindingKind::InputAttachment => self.input_attachments,
		}
	}

	pub fn total(&self) -> u32 {
		// just to make sure this is updated as well
		let BindingCounts {
			uniform_buffers,
			sampled_images,
			input_attachments,
		} = *self;
		uniform_buffers + sampled_images + input_attachments
	}

	/// The capacity a pool needs to hold `sets` binding sets with these counts each.
	pub fn scaled(self, sets: u32) -> Self {
		let scale = |count: u32| {
			count
				.checked_mul(sets)
				.unwrap_or_else(|| panic!("{:?} times {} sets overflows a pool size", self, sets))
		};
		Self {
			uniform_buffers: scale(self.uniform_buffers),
			sampled_images: scale(self.sampled_images),
			input_attachments: scale(self.input_attachments),
		}
	}

	pub fn min(self, other: Self) -> Self {
		Self {
			uniform_buffers: self.uniform_buffers.min(other.uniform_buffers),
			sampled_images: self.sampled_images.min(other.sampled_images),
			input_attachments: self.input_attachments.min(other.input_attachments),
		}
	}
}
