//! Validation utilities for constructor parameter bounds checking

use crate::common::{Result, SketchError};

/// Maximum capacity for any sketch (2^31 - 1, ~2.1 billion items)
pub const MAX_CAPACITY: u64 = (1u64 << 31) - 1;

/// Validate that capacity is positive and within limits
pub fn validate_capacity(capacity: u64) -> Result<()> {
    if capacity == 0 {
        return Err(SketchError::InvalidParameter {
            param: "capacity".to_string(),
            value: capacity.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if capacity > MAX_CAPACITY {
        return Err(SketchError::InvalidParameter {
            param: "capacity".to_string(),
            value: capacity.to_string(),
            constraint: format!("must not exceed {MAX_CAPACITY}"),
        });
    }
    Ok(())
}

/// Validate that a value is a valid probability (0.0 < p < 1.0)
///
/// Used for epsilon (error rate) and delta (confidence) across CMS, Bloom,
/// and the duplicate detector's threshold validation.
pub fn validate_probability(value: f64, param_name: &str) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(SketchError::InvalidParameter {
            param: param_name.to_string(),
            value: value.to_string(),
            constraint: "must be in range (0.0, 1.0) exclusive".to_string(),
        });
    }
    Ok(())
}

/// Validate that a threshold is in (0.0, 1.0], the contract
/// `duplicate_threshold` requires
pub fn validate_threshold(value: f64, param_name: &str) -> Result<()> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(SketchError::InvalidParameter {
            param: param_name.to_string(),
            value: value.to_string(),
            constraint: "must be in range (0.0, 1.0] inclusive of 1.0".to_string(),
        });
    }
    Ok(())
}

/// Validate that width and depth are positive and within sane bounds for a
/// Count-Min Sketch
pub fn validate_width_depth(width: usize, depth: usize) -> Result<()> {
    const MAX_DIM: usize = 1 << 24;

    if width == 0 {
        return Err(SketchError::InvalidParameter {
            param: "width".to_string(),
            value: width.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if width > MAX_DIM {
        return Err(SketchError::InvalidParameter {
            param: "width".to_string(),
            value: width.to_string(),
            constraint: format!("must not exceed {MAX_DIM}"),
        });
    }
    if depth == 0 {
        return Err(SketchError::InvalidParameter {
            param: "depth".to_string(),
            value: depth.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if depth > MAX_DIM {
        return Err(SketchError::InvalidParameter {
            param: "depth".to_string(),
            value: depth.to_string(),
            constraint: format!("must not exceed {MAX_DIM}"),
        });
    }
    Ok(())
}

/// Validate a positive `usize` parameter (window sizes, top-K caps, shingle
/// lengths) with a caller-supplied name for the error message
pub fn validate_positive_usize(value: usize, param_name: &str) -> Result<()> {
    if value == 0 {
        return Err(SketchError::InvalidParameter {
            param: param_name.to_string(),
            value: value.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Validate a positive `u64` parameter (DGIM window sizes)
pub fn validate_positive_u64(value: u64, param_name: &str) -> Result<()> {
    if value == 0 {
        return Err(SketchError::InvalidParameter {
            param: param_name.to_string(),
            value: value.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_capacity_valid() {
        assert!(validate_capacity(1).is_ok());
        assert!(validate_capacity(1_000_000).is_ok());
        assert!(validate_capacity(MAX_CAPACITY).is_ok());
    }

    #[test]
    fn test_validate_capacity_invalid() {
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(MAX_CAPACITY + 1).is_err());
    }

    #[test]
    fn test_validate_probability_valid() {
        assert!(validate_probability(0.1, "epsilon").is_ok());
        assert!(validate_probability(0.99, "delta").is_ok());
    }

    #[test]
    fn test_validate_probability_invalid() {
        assert!(validate_probability(0.0, "epsilon").is_err());
        assert!(validate_probability(1.0, "delta").is_err());
        assert!(validate_probability(-0.1, "value").is_err());
    }

    #[test]
    fn test_validate_threshold_valid() {
        assert!(validate_threshold(0.7, "duplicate_threshold").is_ok());
        assert!(validate_threshold(1.0, "duplicate_threshold").is_ok());
    }

    #[test]
    fn test_validate_threshold_invalid() {
        assert!(validate_threshold(0.0, "duplicate_threshold").is_err());
        assert!(validate_threshold(1.1, "duplicate_threshold").is_err());
    }

    #[test]
    fn test_validate_width_depth() {
        assert!(validate_width_depth(0, 5).is_err());
        assert!(validate_width_depth(5, 0).is_err());
        assert!(validate_width_depth(256, 5).is_ok());
    }

    #[test]
    fn test_validate_positive_usize() {
        assert!(validate_positive_usize(0, "top_k").is_err());
        assert!(validate_positive_usize(10, "top_k").is_ok());
    }
}
