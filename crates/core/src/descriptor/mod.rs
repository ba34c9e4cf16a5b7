//! The resources bound to a binding set, the layout of its slots and the updates written into it.

mod binding;
mod binding_counts;
mod binding_state;
mod binding_update;
mod dirty_flags;
mod slot_layout;

pub use binding::*;
pub use binding_counts::*;
pub use binding_state::*;
pub use binding_update::*;
pub use dirty_flags::*;
pub use slot_layout::*;
