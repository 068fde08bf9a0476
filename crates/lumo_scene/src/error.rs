//! Errors reported while reading a scene file.

use thiserror::Error;

use lumo_core::FormatError;
use lumo_math::SingularTransformError;

use crate::lexer::SourceLocation;

/// Anything that can go wrong while lexing or parsing a scene.
///
/// Every variant except `Io` carries the source location of the
/// offending token, so the message pinpoints the problem in the file.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A malformed token: an unexpected character, an unterminated
    /// string, or an unparsable number.
    #[error("{location}: {message}")]
    Lex {
        location: SourceLocation,
        message: String,
    },

    /// A well-formed token in a place the grammar does not allow.
    #[error("{location}: {message}")]
    Grammar {
        location: SourceLocation,
        message: String,
    },

    /// Use of a material or variable that was never defined.
    #[error("{location}: unknown {kind} '{name}'")]
    UndefinedReference {
        location: SourceLocation,
        kind: &'static str,
        name: String,
    },

    /// Redefinition of something that must stay unique, such as the
    /// camera or a variable pinned from the command line.
    #[error("{location}: '{name}' cannot be redefined")]
    Redefinition {
        location: SourceLocation,
        name: String,
    },

    /// A scaling with a zero component, or any other non-invertible
    /// transformation.
    #[error("{location}: {source}")]
    SingularTransform {
        location: SourceLocation,
        source: SingularTransformError,
    },

    /// A referenced image file could not be opened.
    #[error("{location}: cannot open '{path}': {source}")]
    FileRead {
        location: SourceLocation,
        path: String,
        source: std::io::Error,
    },

    /// A referenced image file is not valid PFM.
    #[error("{location}: invalid PFM file '{path}': {source}")]
    InvalidImage {
        location: SourceLocation,
        path: String,
        source: FormatError,
    },

    /// The scene file itself could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
