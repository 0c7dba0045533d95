//! Alignment measurement samples.

/// One throttled alignment measurement.
///
/// Produced by the engine once per processed pose update and consumed by
/// the display and telemetry sinks. Values are pure functions of the input
/// poses; identical poses yield identical samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentSample {
    /// Capture timestamp, milliseconds since navigation start.
    pub timestamp_ms: u64,
    /// Frontal-plane deviation, degrees (positive toward lateral = varus).
    pub varus_valgus_deg: f64,
    /// Sagittal-plane flexion, degrees (positive toward anterior).
    pub flexion_deg: f64,
    /// Medial condyle to resection plane, millimeters.
    pub medial_gap_mm: f64,
    /// Lateral condyle to resection plane, millimeters.
    pub lateral_gap_mm: f64,
}
