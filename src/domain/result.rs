//! Result type alias for padkit

use super::errors::PadkitError;

/// Result type alias for padkit operations
///
/// # Examples
///
/// ```
/// use padkit::domain::result::Result;
/// use padkit::domain::errors::PadkitError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PadkitError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PadkitError>;
