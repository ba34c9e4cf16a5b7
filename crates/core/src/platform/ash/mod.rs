mod convert;
mod platform;

pub use platform::*;
