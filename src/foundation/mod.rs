/// Crate-wide error taxonomy.
pub(crate) mod error;
