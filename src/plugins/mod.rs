//! Starter kits extending a map with extra layer adapters and load hooks

pub mod base;

pub use base::{LayerAdapterProvider, StarterKit};
