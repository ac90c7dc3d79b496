//! Configuration access port trait.

pub trait ConfigPort {
    /// Raw value for `key` in `section`, `None` when absent. Typed parsing
    /// lives in the validation layer so a malformed value surfaces as a
    /// config error instead of silently becoming a default.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
