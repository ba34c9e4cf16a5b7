use ash::vk::{Buffer, Handle, ImageLayout, ImageView, Sampler};
use binding_set_cache::descriptor::ImageBinding;

pub mod content_addressing;
pub mod eviction;
pub mod pool_exhaustion;
pub mod teardown;

/// A fake buffer handle, only ever compared and never dereferenced by the caches under test
pub fn buffer(raw: u64) -> Buffer {
	Buffer::from_raw(raw)
}

/// A fake sampled image binding with distinct sampler and view handles derived from `raw`
pub fn sampled_image(raw: u64) -> ImageBinding {
	ImageBinding::new(
		Sampler::from_raw(raw),
		ImageView::from_raw(raw + 1),
		ImageLayout::SHADER_READ_ONLY_OPTIMAL,
	)
}
