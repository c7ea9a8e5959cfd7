//! Result type alias for the PHI boundary

use super::errors::BoundaryError;

/// Result type alias for boundary operations
///
/// # Examples
///
/// ```
/// use phi_boundary::domain::result::Result;
/// use phi_boundary::domain::errors::BoundaryError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BoundaryError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BoundaryError>;
