//! Write confinement: every save target must resolve inside one approved directory.

/// Lexical path confinement.
pub mod confine;
