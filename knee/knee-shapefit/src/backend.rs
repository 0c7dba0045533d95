//! Pluggable fitting backends.
//!
//! The fine fit against the full landmark cloud is delegated to a
//! [`ShapeModelBackend`]. Two implementations ship here:
//!
//! - [`LinearShapeModel`] fits in-process by rigidly aligning the template
//!   to the fixed landmarks. Used by tests and as a fallback.
//! - [`SubprocessBackend`] invokes an external fitting executable with a
//!   fixed argument grammar and a hard deadline. The navigation host cannot
//!   tolerate an unbounded block, so the child is polled and killed on
//!   timeout.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use knee_io::{load_ply, save_ply};
use knee_registration::rigid_from_landmarks;
use knee_types::{BoneMesh, Point3};
use tracing::{debug, warn};

use crate::error::{ShapeFitError, ShapeFitResult};
use crate::model::LinearShapeModel;

/// A fine-fit request handed to a backend.
#[derive(Debug, Clone)]
pub struct FitRequest {
    /// Path to the on-disk shape model artifact.
    pub model_path: PathBuf,
    /// Fixed (measured) landmark positions, world space.
    pub fixed_landmarks: Vec<Point3<f64>>,
    /// Moving landmark positions on the template, same order as the fixed
    /// list.
    pub moving_landmarks: Vec<Point3<f64>>,
    /// Regularization weight forwarded to the backend.
    pub regularization: f64,
    /// The template mesh the backend starts from.
    pub template: BoneMesh,
}

/// A shape-fitting backend producing a refined mesh from a template and a
/// landmark cloud.
pub trait ShapeModelBackend {
    /// Fits the template to the fixed landmarks.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeFitError::BackendUnavailable`] or
    /// [`ShapeFitError::BackendTimeout`] when the backend cannot produce a
    /// mesh; callers abort the registration phase on either.
    fn fit(&self, request: &FitRequest) -> ShapeFitResult<BoneMesh>;
}

/// In-process fallback: rigid alignment of the template onto the fixed
/// landmarks, no shape change.
impl ShapeModelBackend for LinearShapeModel {
    fn fit(&self, request: &FitRequest) -> ShapeFitResult<BoneMesh> {
        let pose = rigid_from_landmarks(&request.moving_landmarks, &request.fixed_landmarks)?;
        Ok(request.template.transformed(&pose))
    }
}

/// External fitting executable with the fixed argument grammar:
///
/// ```text
/// <exe> <model> <fixed-landmarks> <moving-landmarks> <regularization>
///       <template.ply> <output.ply>
/// ```
///
/// Landmark lists are semicolon-separated `x,y,z` triples. Meshes cross the
/// process boundary as PLY files in a per-call temporary directory.
#[derive(Debug, Clone)]
pub struct SubprocessBackend {
    executable: PathBuf,
    timeout: Duration,
}

/// How often the child process is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

impl SubprocessBackend {
    /// Creates a backend around the given executable with a 30 s deadline.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the deadline for one fitting call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn format_landmarks(points: &[Point3<f64>]) -> String {
        points
            .iter()
            .map(|p| format!("{},{},{}", p.x, p.y, p.z))
            .collect::<Vec<_>>()
            .join(";")
    }

    fn wait_with_deadline(&self, child: &mut std::process::Child) -> ShapeFitResult<i32> {
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status.code().unwrap_or(-1)),
                Ok(None) => {
                    if start.elapsed() >= self.timeout {
                        warn!(
                            timeout_secs = self.timeout.as_secs_f64(),
                            "killing fitting backend after deadline"
                        );
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ShapeFitError::BackendTimeout {
                            timeout_secs: self.timeout.as_secs_f64(),
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(ShapeFitError::BackendUnavailable(format!(
                        "failed to poll fitting process: {e}"
                    )))
                }
            }
        }
    }
}

impl ShapeModelBackend for SubprocessBackend {
    fn fit(&self, request: &FitRequest) -> ShapeFitResult<BoneMesh> {
        let dir = tempfile::tempdir().map_err(|e| {
            ShapeFitError::BackendUnavailable(format!("cannot create work directory: {e}"))
        })?;
        let template_path = dir.path().join("template.ply");
        let output_path = dir.path().join("fitted.ply");

        save_ply(&request.template, &template_path).map_err(|e| {
            ShapeFitError::BackendUnavailable(format!("cannot write template mesh: {e}"))
        })?;

        debug!(
            executable = %self.executable.display(),
            landmarks = request.fixed_landmarks.len(),
            "spawning fitting backend"
        );

        let mut child = Command::new(&self.executable)
            .arg(&request.model_path)
            .arg(Self::format_landmarks(&request.fixed_landmarks))
            .arg(Self::format_landmarks(&request.moving_landmarks))
            .arg(request.regularization.to_string())
            .arg(&template_path)
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                ShapeFitError::BackendUnavailable(format!(
                    "cannot spawn {}: {e}",
                    self.executable.display()
                ))
            })?;

        let code = self.wait_with_deadline(&mut child)?;
        if code != 0 {
            return Err(ShapeFitError::BackendUnavailable(format!(
                "fitting process exited with status {code}"
            )));
        }
        if !Path::new(&output_path).exists() {
            return Err(ShapeFitError::BackendUnavailable(
                "fitting process produced no output mesh".to_string(),
            ));
        }

        load_ply(&output_path)
            .map_err(|e| ShapeFitError::BackendUnavailable(format!("unreadable output mesh: {e}")))
    }
}
