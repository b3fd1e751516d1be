use std::fmt::Display;

/// Converts the error of a `Result` into a `String`, prefixed with some
/// context about what was attempted.
pub trait ErrorStringExt<T> {
    fn err_to_string(self, context: &str) -> Result<T, String>;
}

impl<T, E: Display> ErrorStringExt<T> for Result<T, E> {
    fn err_to_string(self, context: &str) -> Result<T, String> {
        self.map_err(|err| format!("{context}: {err}"))
    }
}
