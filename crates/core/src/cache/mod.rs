mod binding_set_cache;
mod clock;

pub use binding_set_cache::*;
pub use clock::*;
