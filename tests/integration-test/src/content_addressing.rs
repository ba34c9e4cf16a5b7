#![cfg(test)]

use crate::{buffer, sampled_image};
use ash::vk::Buffer;
use binding_set_cache::cache::{BindingCacheCreateInfo, BindingSetCache, FrameClock};
use binding_set_cache::descriptor::{BindingCounts, BindingDescriptor, BindingUpdate};
use binding_set_cache::platform::headless::Headless;
use binding_set_cache::platform::BindingPlatform;

#[test]
fn test_content_addressing_headless() -> anyhow::Result<()> {
	let headless = Headless::new();
	test_content_addressing(headless.clone())?;
	let stats = headless.stats();
	assert_eq!(stats.sets_allocated, 2);
	assert_eq!(stats.sets_freed, 2);
	Ok(())
}

/// Two uniform buffers and one sampled image, no input attachments.
fn test_content_addressing<P: BindingPlatform>(platform: P) -> anyhow::Result<()> {
	let a = buffer(0xa);
	let b = buffer(0xb);
	let d = sampled_image(0xd);

	let mut cache = unsafe {
		BindingSetCache::new(
			platform,
			FrameClock::new(),
			BindingCacheCreateInfo::unset(BindingCounts::new(2, 1, 0)),
		)?
	};
	let mut updates = Vec::new();

	// every slot bound: a new set with all three bindings written
	cache.set_uniform_buffer(0, a);
	cache.set_uniform_buffer(1, b);
	cache.set_image_binding(2, d);
	let x = cache.resolve_deferred(&mut updates);
	assert!(x.newly_written);
	assert_eq!(
		updates,
		vec![
			BindingUpdate {
				set: x.set,
				binding: 0,
				descriptor: BindingDescriptor::UniformBuffer(a),
			},
			BindingUpdate {
				set: x.set,
				binding: 1,
				descriptor: BindingDescriptor::UniformBuffer(b),
			},
			BindingUpdate {
				set: x.set,
				binding: 2,
				descriptor: BindingDescriptor::SampledImage(d),
			},
		]
	);
	unsafe { cache.platform().apply_updates(&updates) };

	// slot 0 unset: another set, the unset slot is not written at all
	cache.set_uniform_buffer(0, Buffer::null());
	let y = cache.resolve_deferred(&mut updates);
	assert!(y.newly_written);
	assert_ne!(y.set, x.set);
	assert_eq!(updates.iter().map(|update| update.binding).collect::<Vec<_>>(), vec![1, 2]);
	unsafe { cache.platform().apply_updates(&updates) };

	// back to the first content: the first set is reused without writing anything
	cache.set_uniform_buffer(0, a);
	let again = cache.resolve_deferred(&mut updates);
	assert_eq!(again.set, x.set);
	assert!(again.newly_written);
	assert!(updates.is_empty());
	assert_eq!(cache.len(), 2);

	// and binding it again is a no-op
	let unchanged = cache.resolve_deferred(&mut updates);
	assert_eq!(unchanged.set, x.set);
	assert!(!unchanged.newly_written);
	Ok(())
}
