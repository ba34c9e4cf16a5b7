use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::Arc;
use std::time::Instant;

/// A logical point in time. Only the ordering of timestamps matters, their unit is up to the [`Clock`].
pub type Timestamp = u64;

/// Source of the timestamps a [`BindingSetCache`] records on every resolve and compares against when evicting.
/// Must never go backwards.
///
/// [`BindingSetCache`]: crate::cache::BindingSetCache
pub trait Clock {
	fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
	#[inline]
	fn now(&self) -> Timestamp {
		(**self).now()
	}
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
	#[inline]
	fn now(&self) -> Timestamp {
		(**self).now()
	}
}

/// A frame counter advanced by the caller, usually once per frame. Eviction ages are then measured in frames.
#[derive(Debug, Default)]
pub struct FrameClock {
	frame: AtomicU64,
}

impl FrameClock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Moves to the next frame and returns it.
	pub fn advance(&self) -> Timestamp {
		self.frame.fetch_add(1, Relaxed) + 1
	}

	/// Jumps to `frame`, which must not be before the current frame.
	pub fn set(&self, frame: Timestamp) {
		let prev = self.frame.swap(frame, Relaxed);
		assert!(prev <= frame, "FrameClock must not go backwards, {} -> {}", prev, frame);
	}
}

impl Clock for FrameClock {
	#[inline]
	fn now(&self) -> Timestamp {
		self.frame.load(Relaxed)
	}
}

/// Milliseconds elapsed since the clock was created, eviction ages are then measured in milliseconds.
#[derive(Copy, Clone, Debug)]
pub struct InstantClock {
	start: Instant,
}

impl InstantClock {
	pub fn new() -> Self {
		Self { start: Instant::now() }
	}
}

impl Default for InstantClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for InstantClock {
	fn now(&self) -> Timestamp {
		self.start.elapsed().as_millis() as Timestamp
	}
}
