//! Plugin module.
//!
//! Contains the registry of job plugins that submissions may request.

pub mod registry;

pub use registry::{InMemoryPluginRegistry, PluginEntry, PluginRegistry, RegistryBuilder};
