//! Naming rules gating the loader.
//!
//! Two stateless predicates, checked before any I/O. They only answer
//! yes/no; the loader turns a `false` into the corresponding
//! [`LoadError`](crate::LoadError) variant.

use std::path::Path;

/// True iff the path's final extension is exactly `csv`, case-sensitively:
/// `LISTE.CSV` is rejected, uppercase extensions are not corrected.
#[must_use]
pub fn is_csv_extension(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("csv")
}

/// True iff the name contains no uppercase character. Strings with no
/// cased characters at all ("1891.csv") are vacuously lowercase.
#[must_use]
pub fn is_lowercase_name(name: &str) -> bool {
    !name.chars().any(char::is_uppercase)
}
