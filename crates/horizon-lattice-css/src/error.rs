//! Error types for CSS generation.

use std::path::PathBuf;

/// Result type alias for CSS generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, naming or serializing rules.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A function descriptor is inconsistent with the catalog it is registered in.
    #[error("Malformed descriptor for '{function}': {message}")]
    MalformedDescriptor { function: String, message: String },

    /// A value reached a conversion point that has no rule for it.
    #[error("Unsupported {kind} value in {context}")]
    UnsupportedValueKind { kind: &'static str, context: String },

    /// A rule reference was rendered before its scope assigned it a name.
    #[error("Rule '{slot}' has no name yet; process its scope first")]
    UnassignedName { slot: String },

    /// A rule that already has a name was named again.
    #[error("Rule '{slot}' already has a name; cannot assign '{name}'")]
    DuplicateName { name: String, slot: String },

    /// A style definition failed while declaring its rules.
    #[error("Failed to construct style definition '{definition}': {message}")]
    DefinitionConstruction { definition: String, message: String },

    /// A style definition refers back to itself while being constructed.
    #[error("Style definition '{definition}' depends on itself")]
    DefinitionCycle { definition: String },

    /// A scope id that the engine does not own.
    #[error("Unknown style scope")]
    UnknownScope,

    /// The global catalog was already initialized.
    #[error("The function catalog is already installed")]
    CatalogAlreadyInstalled,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// File I/O error.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a descriptor error.
    pub fn malformed(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported-value error.
    pub fn unsupported(kind: &'static str, context: impl Into<String>) -> Self {
        Self::UnsupportedValueKind {
            kind,
            context: context.into(),
        }
    }

    /// Create a definition construction error.
    pub fn construction(definition: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DefinitionConstruction {
            definition: definition.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a configuration or invariant failure that should
    /// stop processing rather than be handled locally.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MalformedDescriptor { .. }
                | Self::DuplicateName { .. }
                | Self::CatalogAlreadyInstalled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let err = Error::malformed("rgb", "duplicate field 'r'");
        assert_eq!(err.to_string(), "Malformed descriptor for 'rgb': duplicate field 'r'");

        let err = Error::unsupported("record", "property 'color'");
        assert_eq!(err.to_string(), "Unsupported record value in property 'color'");
    }

    #[test]
    fn fatal_classification() {
        assert!(Error::malformed("x", "y").is_fatal());
        assert!(!Error::unsupported("record", "x").is_fatal());
        assert!(!Error::construction("App", "boom").is_fatal());
    }
}
