use std::fmt::{Debug, Formatter};

/// Generational index into an [`EntryArena`]. An id stays unique after its entry was removed: the slot may be
/// reused, but only with a higher version, so stale ids never alias a newer entry.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct EntryId {
	index: u32,
	version: u32,
}

impl EntryId {
	#[inline]
	pub fn index(&self) -> u32 {
		self.index
	}

	#[inline]
	pub fn version(&self) -> u32 {
		self.version
	}
}

impl Debug for EntryId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "EntryId({}v{})", self.index, self.version)
	}
}

struct ArenaSlot<T> {
	version: u32,
	value: Option<T>,
}

/// Stores values by [`EntryId`] instead of by address, so a table keyed by content can refer to them without
/// relying on the table never moving its values.
pub struct EntryArena<T> {
	slots: Vec<ArenaSlot<T>>,
	dead: Vec<u32>,
	len: usize,
}

impl<T> Default for EntryArena<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> EntryArena<T> {
	pub fn new() -> Self {
		Self::with_capacity(0)
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			slots: Vec::with_capacity(capacity),
			dead: Vec::new(),
			len: 0,
		}
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn insert(&mut self, value: T) -> EntryId {
		self.len += 1;
		if let Some(index) = self.dead.pop() {
			let slot = &mut self.slots[index as usize];
			debug_assert!(slot.value.is_none());
			slot.value = Some(value);
			EntryId {
				index,
				version: slot.version,
			}
		} else {
			let index = u32::try_from(self.slots.len()).expect("EntryArena index overflow");
			self.slots.push(ArenaSlot {
				version: 0,
				value: Some(value),
			});
			EntryId { index, version: 0 }
		}
	}

	pub fn get(&self, id: EntryId) -> Option<&T> {
		self.slots
			.get(id.index as usize)
			.filter(|slot| slot.version == id.version)
			.and_then(|slot| slot.value.as_ref())
	}

	pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
		self.slots
			.get_mut(id.index as usize)
			.filter(|slot| slot.version == id.version)
			.and_then(|slot| slot.value.as_mut())
	}

	#[inline]
	pub fn contains(&self, id: EntryId) -> bool {
		self.get(id).is_some()
	}

	pub fn remove(&mut self, id: EntryId) -> Option<T> {
		let slot = self.slots.get_mut(id.index as usize)?;
		if slot.version != id.version {
			return None;
		}
		let value = slot.value.take()?;
		self.len -= 1;
		// a slot whose version would wrap is retired instead of reused
		if let Some(version) = slot.version.checked_add(1) {
			slot.version = version;
			self.dead.push(id.index);
		}
		Some(value)
	}

	pub fn iter(&self) -> impl Iterator<Item = (EntryId, &T)> + '_ {
		self.slots.iter().zip(0..).filter_map(|(slot, index)| {
			slot.value.as_ref().map(|value| {
				(
					EntryId {
						index,
						version: slot.version,
					},
					value,
				)
			})
		})
	}

	/// Removes all values, invalidating every id handed out so far.
	pub fn drain(&mut self) -> Vec<T> {
		self.len = 0;
		self.dead.clear();
		let mut values = Vec::new();
		for (slot, index) in self.slots.iter_mut().zip(0..) {
			values.extend(slot.value.take());
			if let Some(version) = slot.version.checked_add(1) {
				slot.version = version;
				self.dead.push(index);
			}
		}
		values
	}
}
