// src/error.rs

use thiserror::Error;

/// Configuration failures raised at construction or setup time, always
/// before any field computation starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unrecognised DMI symmetry class string.
    #[error(
        "unsupported DMI type {found:?}; available options: \
         \"bulk\", \"interfacial\", \"D_2d\", \"D_n\", \"C_n\""
    )]
    UnknownDmiVariant { found: String },

    /// Unrecognised integration-scheme name.
    #[error("driver {found:?} is not implemented; valid choices: one of {valid:?}")]
    UnknownDriver {
        found: String,
        valid: &'static [&'static str],
    },

    /// A per-site coefficient array with the wrong length for the mesh
    /// and the number of independent constants.
    #[error(
        "coefficient array has {got} entries, expected {expected} \
         ({n_consts} constant(s) over {n} cells)"
    )]
    CoefficientLength {
        got: usize,
        expected: usize,
        n_consts: usize,
        n: usize,
    },

    /// A two-constant coefficient description given to a single-constant
    /// interaction (or vice versa).
    #[error("coefficient description provides {given} constant(s), the interaction takes {expected}")]
    CoefficientArity { given: usize, expected: usize },

    /// A boolean geometry mask whose length does not match the mesh.
    #[error("mask has {got} entries, mesh has {n} cells")]
    MaskLength { got: usize, n: usize },
}
