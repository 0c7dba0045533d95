//! Fixed-format alignment telemetry record.
//!
//! Each throttled alignment sample is forwarded to the secondary display as
//! one semicolon-delimited text line:
//!
//! ```text
//! ALN;<timestamp_ms>;<varus_valgus_deg>;<flexion_deg>;<medial_gap_mm>;<lateral_gap_mm>
//! ```
//!
//! Angles and gaps carry two decimals, the resolution the display renders.

use crate::error::{IoError, IoResult};

/// Record tag identifying an alignment line on the wire.
pub const RECORD_TAG: &str = "ALN";

/// One alignment result as sent to the secondary display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentRecord {
    /// Capture timestamp, milliseconds since navigation start.
    pub timestamp_ms: u64,
    /// Frontal-plane deviation, degrees (positive = varus).
    pub varus_valgus_deg: f64,
    /// Sagittal-plane flexion, degrees.
    pub flexion_deg: f64,
    /// Medial compartment gap, millimeters.
    pub medial_gap_mm: f64,
    /// Lateral compartment gap, millimeters.
    pub lateral_gap_mm: f64,
}

impl AlignmentRecord {
    /// Formats the record as one delimited wire line (no trailing newline).
    ///
    /// # Example
    ///
    /// ```
    /// use knee_io::AlignmentRecord;
    ///
    /// let record = AlignmentRecord {
    ///     timestamp_ms: 1500,
    ///     varus_valgus_deg: 2.125,
    ///     flexion_deg: 90.0,
    ///     medial_gap_mm: 9.5,
    ///     lateral_gap_mm: 10.25,
    /// };
    /// assert_eq!(record.to_line(), "ALN;1500;2.13;90.00;9.50;10.25");
    /// ```
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{RECORD_TAG};{};{:.2};{:.2};{:.2};{:.2}",
            self.timestamp_ms,
            self.varus_valgus_deg,
            self.flexion_deg,
            self.medial_gap_mm,
            self.lateral_gap_mm
        )
    }

    /// Parses a wire line produced by [`to_line`](Self::to_line).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidContent`] for a wrong tag, wrong field
    /// count, or non-numeric fields.
    pub fn parse(line: &str) -> IoResult<Self> {
        let fields: Vec<&str> = line.trim_end().split(';').collect();
        if fields.len() != 6 {
            return Err(IoError::invalid_content(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }
        if fields[0] != RECORD_TAG {
            return Err(IoError::invalid_content(format!(
                "unknown record tag: {}",
                fields[0]
            )));
        }

        let timestamp_ms = fields[1]
            .parse::<u64>()
            .map_err(|e| IoError::invalid_content(format!("bad timestamp: {e}")))?;
        let mut values = [0.0f64; 4];
        for (slot, field) in values.iter_mut().zip(&fields[2..]) {
            *slot = field
                .parse::<f64>()
                .map_err(|e| IoError::invalid_content(format!("bad numeric field: {e}")))?;
        }

        Ok(Self {
            timestamp_ms,
            varus_valgus_deg: values[0],
            flexion_deg: values[1],
            medial_gap_mm: values[2],
            lateral_gap_mm: values[3],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn round_trip() {
        let record = AlignmentRecord {
            timestamp_ms: 123_456,
            varus_valgus_deg: -3.5,
            flexion_deg: 87.25,
            medial_gap_mm: 8.0,
            lateral_gap_mm: 11.75,
        };
        let parsed = AlignmentRecord::parse(&record.to_line()).unwrap();
        assert_eq!(parsed.timestamp_ms, 123_456);
        assert_relative_eq!(parsed.varus_valgus_deg, -3.5, epsilon = 1e-9);
        assert_relative_eq!(parsed.lateral_gap_mm, 11.75, epsilon = 1e-9);
    }

    #[test]
    fn rejects_wrong_tag() {
        let result = AlignmentRecord::parse("XXX;0;0.00;0.00;0.00;0.00");
        assert!(matches!(result, Err(IoError::InvalidContent(_))));
    }

    #[test]
    fn rejects_short_line() {
        let result = AlignmentRecord::parse("ALN;0;1.0");
        assert!(matches!(result, Err(IoError::InvalidContent(_))));
    }

    #[test]
    fn rejects_garbage_numbers() {
        let result = AlignmentRecord::parse("ALN;0;abc;0.00;0.00;0.00");
        assert!(matches!(result, Err(IoError::InvalidContent(_))));
    }

    #[test]
    fn tolerates_trailing_newline() {
        let parsed = AlignmentRecord::parse("ALN;10;1.00;2.00;3.00;4.00\n").unwrap();
        assert_eq!(parsed.timestamp_ms, 10);
    }
}
