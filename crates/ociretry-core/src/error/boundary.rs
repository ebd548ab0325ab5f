/// Declare how a foreign error converts into one of our error types.
///
/// Expands to a `From` implementation, so `?` works across the boundary
/// without a `map_err()` at every call site. Use it where the conversion
/// needs to reshape the error (keep only its message, pick a variant by
/// content) rather than wrap it whole, which `#[from]` already covers.
///
/// # Syntax
///
/// ```ignore
/// error_boundary!(SourceError => TargetError, |err_var| {
///     // conversion logic returning TargetError
/// });
/// ```
///
/// # Example
///
/// ```
/// use ociretry_core::error_boundary;
///
/// #[derive(Debug, thiserror::Error)]
/// enum SettingsError {
///     #[error("bad number: {0}")]
///     Number(String),
/// }
///
/// error_boundary!(std::num::ParseIntError => SettingsError, |e| {
///     SettingsError::Number(e.to_string())
/// });
///
/// fn retries(raw: &str) -> Result<u32, SettingsError> {
///     Ok(raw.trim().parse::<u32>()?)
/// }
///
/// assert_eq!(retries(" 12 ").unwrap(), 12);
/// assert!(retries("twelve").is_err());
/// ```
#[macro_export]
macro_rules! error_boundary {
    ($inner:ty => $outer:ty, |$err:ident| $body:expr) => {
        impl ::std::convert::From<$inner> for $outer {
            fn from($err: $inner) -> $outer {
                $body
            }
        }
    };
}
