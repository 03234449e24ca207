//! Internal utility functions for cutout-kit.
//!
//! This module contains common validation used across different image operations.

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
/// * `context` - A description of the context for error messages
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise an error
pub fn validate_non_empty_image(width: u32, height: u32, context: &str) -> Result<(), String> {
    if width == 0 || height == 0 {
        Err(format!("{context}: Image dimensions must be non-zero"))
    } else {
        Ok(())
    }
}

/// Validates that a fraction lies in the half-open unit interval `[0, 1)`.
///
/// Non-finite values are rejected.
pub fn validate_unit_fraction(value: f64, context: &str) -> Result<(), String> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{context}: Value must be in [0, 1), got {value}"))
    }
}

/// Validates that a kernel side fits the `u8` radius range used by imageproc masks.
pub fn validate_kernel_side(side: u32, context: &str) -> Result<(), String> {
    if (1..=255).contains(&side) {
        Ok(())
    } else {
        Err(format!("{context}: Kernel side must be in 1..=255, got {side}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_non_empty_image_with_valid_dimensions_accepts() {
        validate_non_empty_image(100, 100, "test").unwrap();
        validate_non_empty_image(1, 1, "test").unwrap();
        assert!(validate_non_empty_image(0, 100, "test").is_err());
        assert!(validate_non_empty_image(100, 0, "test").is_err());
        assert!(validate_non_empty_image(0, 0, "test").is_err());
    }

    #[test]
    fn validate_unit_fraction_with_boundaries_accepts_half_open_range() {
        validate_unit_fraction(0.0, "test").unwrap();
        validate_unit_fraction(0.3, "test").unwrap();
        validate_unit_fraction(0.999, "test").unwrap();
        assert!(validate_unit_fraction(1.0, "test").is_err());
        assert!(validate_unit_fraction(-0.1, "test").is_err());
        assert!(validate_unit_fraction(f64::NAN, "test").is_err());
        assert!(validate_unit_fraction(f64::INFINITY, "test").is_err());
    }

    #[test]
    fn validate_kernel_side_with_out_of_range_side_returns_error() {
        validate_kernel_side(1, "test").unwrap();
        validate_kernel_side(255, "test").unwrap();
        assert!(validate_kernel_side(0, "test").is_err());
        assert!(validate_kernel_side(256, "test").is_err());
    }
}
