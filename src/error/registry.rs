//! Registry error module.
//!
//! Errors raised while the component registry is assembled at boot. Every variant
//! is fatal: the process does not start serving when the registry cannot be built.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building the component registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The name-mapping file for a component kind does not exist or cannot be read.
    #[error("Mapping file for {kind} components unreadable at {path}: {source}")]
    MappingUnreadable {
        /// Component kind whose mapping was requested
        kind: &'static str,
        /// Expected location of the mapping file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The name-mapping file is not a JSON object of short name to basename.
    #[error("Mapping file {path} is malformed: {source}")]
    MappingMalformed {
        /// Location of the malformed file
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// The method table file is missing or malformed.
    #[error("Method table {path} could not be loaded: {reason}")]
    MethodTable {
        /// Location of the method table
        path: PathBuf,
        /// Why loading failed
        reason: String,
    },

    /// The component definition tree could not be walked.
    #[error("Failed to walk component tree {path}: {reason}")]
    Walk {
        /// Root of the walk
        path: PathBuf,
        /// Why the walk failed
        reason: String,
    },

    /// A mapping names a definition for which no compiled-in factory exists.
    #[error("No component factory registered for definition '{0}'")]
    UnknownComponent(String),

    /// A component requires another component that has not been registered.
    #[error("Component '{component}' requires '{dependency}', which is not registered")]
    MissingDependency {
        /// Component being constructed
        component: String,
        /// Short name of the missing dependency
        dependency: String,
    },
}
