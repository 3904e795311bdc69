use crate::common::error::SdkSyncError;

/// Result alias used across the crate.
///
/// # Examples
///
/// ```
/// use sdksync::common::result::SdkSyncResult;
/// use sdksync::common::error::SdkSyncError;
///
/// fn example_function() -> SdkSyncResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> SdkSyncResult<()> {
///     Err(SdkSyncError::config_error("Something went wrong"))
/// }
/// ```
pub type SdkSyncResult<T> = Result<T, SdkSyncError>;

/// Conversion helpers from foreign `Result`s into [`SdkSyncResult`].
pub trait ResultExt<T, E> {
    /// Map the error with a custom conversion.
    fn map_sdk_err<F>(self, f: F) -> SdkSyncResult<T>
    where
        F: FnOnce(E) -> SdkSyncError;

    /// Wrap the error as a configuration error.
    fn with_config_error(self, message: impl Into<String>) -> SdkSyncResult<T>
    where
        E: std::error::Error + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn map_sdk_err<F>(self, f: F) -> SdkSyncResult<T>
    where
        F: FnOnce(E) -> SdkSyncError,
    {
        self.map_err(f)
    }

    fn with_config_error(self, message: impl Into<String>) -> SdkSyncResult<T>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.map_err(|e| SdkSyncError::config_error_with_source(message, e))
    }
}
