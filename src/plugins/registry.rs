//! Registry of job plugins known to the admission gate.

use crate::config::AdmissionConfig;
use indexmap::IndexMap;

/// Read-only lookup of registered job plugins.
///
/// The hosting process populates a registry once at startup; validation
/// only ever reads it, so implementations must be safe for concurrent
/// lookups.
pub trait PluginRegistry: Send + Sync {
    /// Whether a plugin with this name is registered.
    fn exists(&self, name: &str) -> bool;
}

/// Names of the plugins compiled into the job controller.
pub const BUILTIN_PLUGINS: &[(&str, &str)] = &[
    ("env", "Injects task index environment variables into each pod"),
    ("ssh", "Distributes an SSH key pair so pods can reach each other"),
    ("svc", "Creates a headless service and host files for the job"),
];

/// Registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEntry {
    /// Plugin name as used in a job's `plugins` map.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Whether the plugin ships with the controller.
    pub builtin: bool,
}

/// In-memory plugin registry.
///
/// Keeps registration order so listings are stable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPluginRegistry {
    plugins: IndexMap<String, PluginEntry>,
}

impl InMemoryPluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            plugins: IndexMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Create a registry from startup configuration.
    pub fn from_config(config: &AdmissionConfig) -> Self {
        let mut builder = RegistryBuilder::new().with_builtins(config.builtin_plugins);
        for plugin in &config.plugins {
            builder = builder.register(
                plugin.name.clone(),
                plugin.description.clone().unwrap_or_default(),
            );
        }
        builder.build()
    }

    fn register_builtins(&mut self) {
        for (name, description) in BUILTIN_PLUGINS {
            self.plugins.insert(
                name.to_string(),
                PluginEntry {
                    name: name.to_string(),
                    description: description.to_string(),
                    builtin: true,
                },
            );
        }
    }

    /// Register a plugin. Returns false if the name was already taken, in
    /// which case the existing entry is kept.
    pub fn register(&mut self, name: impl Into<String>, description: impl Into<String>) -> bool {
        let name = name.into();
        if self.plugins.contains_key(&name) {
            log::warn!("plugin '{}' is already registered", name);
            return false;
        }

        self.plugins.insert(
            name.clone(),
            PluginEntry {
                name,
                description: description.into(),
                builtin: false,
            },
        );
        true
    }

    /// Unregister a plugin.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.plugins.shift_remove(name).is_some()
    }

    /// Check if a plugin is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Get a registry entry.
    pub fn get(&self, name: &str) -> Option<&PluginEntry> {
        self.plugins.get(name)
    }

    /// All registered plugin names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(|s| s.as_str())
    }

    /// All registry entries, in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &PluginEntry> {
        self.plugins.values()
    }

    /// Get the total number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl PluginRegistry for InMemoryPluginRegistry {
    fn exists(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// Builder for creating a customized registry.
pub struct RegistryBuilder {
    registry: InMemoryPluginRegistry,
    include_builtins: bool,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            registry: InMemoryPluginRegistry::new(),
            include_builtins: true,
        }
    }

    /// Include or exclude built-in plugins.
    pub fn with_builtins(mut self, include: bool) -> Self {
        self.include_builtins = include;
        self
    }

    /// Register a custom plugin.
    pub fn register(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.registry.register(name, description);
        self
    }

    /// Build the registry.
    pub fn build(mut self) -> InMemoryPluginRegistry {
        if self.include_builtins {
            let custom = std::mem::take(&mut self.registry.plugins);
            self.registry.register_builtins();
            for (name, entry) in custom {
                self.registry.plugins.entry(name).or_insert(entry);
            }
        }
        self.registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
