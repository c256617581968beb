//! Compile-time embedded default catalog

use once_cell::sync::Lazy;

use super::Catalog;

/// Embedded catalog TOML content (compile-time)
pub const BUILTIN_CATALOG_TOML: &str = include_str!("../../assets/catalog.toml");

static BUILTIN: Lazy<Catalog> =
    Lazy::new(|| Catalog::from_toml(BUILTIN_CATALOG_TOML).expect("embedded catalog is valid"));

/// The built-in hunt used when no catalog file is configured
pub fn builtin() -> &'static Catalog {
    &BUILTIN
}
