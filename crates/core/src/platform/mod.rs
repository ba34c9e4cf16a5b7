#[cfg(feature = "ash")]
pub mod ash;
mod binding_platform;
pub mod headless;

pub use binding_platform::*;
