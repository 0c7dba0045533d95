//! Implant size templates.
//!
//! Each size is a fixed set of anterior/posterior check-point pairs
//! expressed in the anatomical frame. Templates are static reference data
//! shipped with the implant family.

use nalgebra::Point3;

/// One anterior/posterior check-point pair, anatomical-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckPointPair {
    /// Anterior check-point, millimeters.
    pub anterior: Point3<f64>,
    /// Posterior check-point, millimeters.
    pub posterior: Point3<f64>,
}

impl CheckPointPair {
    /// Creates a check-point pair.
    #[must_use]
    pub const fn new(anterior: Point3<f64>, posterior: Point3<f64>) -> Self {
        Self {
            anterior,
            posterior,
        }
    }
}

/// A candidate implant size: a label and its check-point pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplantTemplate {
    /// Manufacturer size label (e.g. `"3"`, `"4N"`).
    pub size_label: String,
    /// Check-point pairs evaluated against the bone surface.
    pub check_pairs: Vec<CheckPointPair>,
}

impl ImplantTemplate {
    /// Creates a template.
    #[must_use]
    pub fn new(size_label: impl Into<String>, check_pairs: Vec<CheckPointPair>) -> Self {
        Self {
            size_label: size_label.into(),
            check_pairs,
        }
    }
}
