//! Parameter environments for template rendering.
//!
//! A [`ParamEnv`] is an insertion-ordered name → value map. The engine
//! injects a small closed set of [`Reserved`] parameters (working
//! directory, descriptor directory, resolved source/target, the default
//! destination anchor, and the project-layout extensions); user
//! parameters are layered on top and may never shadow a reserved name,
//! with one exception: the `__default__` anchor is explicitly
//! user-overridable.
//!
//! Environments are cloned at every recursive link entry so sibling
//! branches never observe each other's transient bindings.

use indexmap::IndexMap;

use crate::error::ConfigError;

/// Template parameters injected by the engine itself.
///
/// The set is closed: collision checks in [`ParamEnv::declare`] are an
/// exact match against these names, not a naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reserved {
    /// `__cwd__` — working directory at process start.
    Cwd,
    /// `__dir__` — directory of the governing configuration or descriptor file.
    Dir,
    /// `__source__` — resolved package source directory.
    Source,
    /// `__target__` — resolved link target directory.
    Target,
    /// `__default__` — default destination anchor. User-overridable.
    Default,
    /// `__project__` — project directory (project-layout hook).
    Project,
    /// `__assets__` — assets directory (project-layout hook).
    Assets,
    /// `__plugins__` — plugins directory (project-layout hook).
    Plugins,
}

impl Reserved {
    /// All reserved parameters, for collision checks.
    pub const ALL: [Self; 8] = [
        Self::Cwd,
        Self::Dir,
        Self::Source,
        Self::Target,
        Self::Default,
        Self::Project,
        Self::Assets,
        Self::Plugins,
    ];

    /// The template-visible name of this parameter.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cwd => "__cwd__",
            Self::Dir => "__dir__",
            Self::Source => "__source__",
            Self::Target => "__target__",
            Self::Default => "__default__",
            Self::Project => "__project__",
            Self::Assets => "__assets__",
            Self::Plugins => "__plugins__",
        }
    }

    /// Look up a reserved parameter by its template-visible name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }
}

/// Insertion-ordered parameter map.
#[derive(Debug, Clone, Default)]
pub struct ParamEnv {
    values: IndexMap<String, String>,
}

impl ParamEnv {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a reserved parameter, overwriting any previous value.
    pub fn bind(&mut self, key: Reserved, value: impl Into<String>) {
        self.values.insert(key.name().to_string(), value.into());
    }

    /// Bind the `__default__` anchor only if it is not already set.
    ///
    /// The anchor is the one reserved parameter a user may supply; an
    /// existing binding (from a `-p` override or declared parameter)
    /// always wins over the engine's derived value.
    pub fn bind_default_anchor(&mut self, value: impl Into<String>) {
        self.values
            .entry(Reserved::Default.name().to_string())
            .or_insert_with(|| value.into());
    }

    /// Declare a user parameter.
    ///
    /// Overwrites an earlier declaration of the same name, which is how
    /// command-line overrides shadow file-declared parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReservedParameter`] if `name` collides with
    /// a reserved parameter other than `__default__`.
    pub fn declare(&mut self, name: &str, value: impl Into<String>) -> Result<(), ConfigError> {
        if Reserved::from_name(name).is_some_and(|r| r != Reserved::Default) {
            return Err(ConfigError::ReservedParameter(name.to_string()));
        }
        self.values.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Look up a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Whether a parameter is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the environment is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
