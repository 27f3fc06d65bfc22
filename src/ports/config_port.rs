//! Configuration access port.

/// Raw key lookup. Typed parsing and validation live in
/// [`crate::domain::config_validation`] so that every source reports bad
/// values the same way.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
