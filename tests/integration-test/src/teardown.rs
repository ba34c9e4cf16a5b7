#![cfg(test)]

use crate::{buffer, sampled_image};
use ash::vk::{Handle, ImageLayout, ImageView};
use binding_set_cache::cache::{BindingCacheCreateInfo, BindingSetCache, FrameClock};
use binding_set_cache::descriptor::{BindingCounts, ImageBinding};
use binding_set_cache::platform::headless::{Headless, HeadlessStats};

#[test]
fn test_teardown_headless() -> anyhow::Result<()> {
	let headless = Headless::new();
	{
		let mut cache = unsafe {
			BindingSetCache::new(
				headless.clone(),
				FrameClock::new(),
				BindingCacheCreateInfo::unset(BindingCounts::new(1, 1, 1)),
			)?
		};
		for raw in 1..=5 {
			cache.set_uniform_buffer(0, buffer(raw));
			cache.set_image_binding(1, sampled_image(raw * 10));
			cache.set_input_attachment(
				2,
				ImageBinding::input_attachment(ImageView::from_raw(raw * 100), ImageLayout::SHADER_READ_ONLY_OPTIMAL),
			);
			cache.resolve();
		}
		assert_eq!(headless.live_sets(), 5);
		assert_eq!(headless.live_pools(), 1);
		assert_eq!(headless.live_layouts(), 1);
	}

	assert_eq!(
		headless.stats(),
		HeadlessStats {
			layouts_created: 1,
			layouts_destroyed: 1,
			pools_created: 1,
			pools_destroyed: 1,
			sets_allocated: 5,
			sets_freed: 5,
			update_batches: 5,
			updates_applied: 15,
		}
	);
	assert_eq!(headless.live_sets(), 0);
	assert_eq!(headless.live_pools(), 0);
	assert_eq!(headless.live_layouts(), 0);
	Ok(())
}
