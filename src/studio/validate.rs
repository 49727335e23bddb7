use crate::catalog::client::MockupVariant;
use crate::studio::state::{DesignState, MAX_LOGOS_PER_SIDE};

/// Typed pre-submission validation failures.
///
/// Returned from [`validate_submission`] instead of being surfaced through
/// blocking UI dialogs, so presentation stays the caller's concern.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// No mockup variant has been selected.
    #[error("no mockup variant selected")]
    MissingVariant,

    /// The product name is empty or whitespace.
    #[error("design name is required")]
    MissingName,

    /// Neither side carries a logo or text.
    #[error("design is empty: add a logo or text to at least one side")]
    EmptyDesign,

    /// A side already holds the maximum number of logos.
    #[error("a side holds at most {MAX_LOGOS_PER_SIDE} logos")]
    LogoLimit,
}

/// Validate a design for submission.
///
/// Pure: inspects state only, performs no IO, and reports the first failure
/// in the order the submit flow checks them.
pub fn validate_submission(
    name: &str,
    variant: Option<&MockupVariant>,
    design: &DesignState,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if variant.is_none() {
        return Err(ValidationError::MissingVariant);
    }
    if design.is_empty() {
        return Err(ValidationError::EmptyDesign);
    }
    Ok(())
}
