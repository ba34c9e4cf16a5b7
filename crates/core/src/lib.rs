//! Content-addressed caching of binding sets for a single fixed layout.
//!
//! A [`BindingSetCache`](cache::BindingSetCache) tracks which resources are bound to each slot of its layout and
//! hands out a [`vk::DescriptorSet`](ash::vk::DescriptorSet) matching them, reusing previously written sets with
//! the same content instead of allocating and writing a new one on every draw.

pub mod backing;
pub mod cache;
pub mod descriptor;
pub mod platform;
