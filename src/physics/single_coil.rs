//! Single-coil evaluation with a finite-difference field-magnitude gradient.
use nalgebra::Vector3;

use crate::error::Error;
use crate::physics::circular_loop::{flux_density_circular_loop, point_from_cm, LoopSpec};

/// (m) floor on the half-step of the centered differences, keeping the
/// probe points far enough apart to avoid catastrophic cancellation.
const GRAD_STEP_FLOOR: f64 = 1e-5;

/// (m/m) half-step per meter of loop radius, so the probe spacing scales
/// with the coil size.
const GRAD_STEP_PER_RADIUS: f64 = 1e-4;

/// One field sample of a single coil: flux density, its magnitude, and the
/// centered-difference gradient of the magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSample {
    /// (T) flux density
    pub b: Vector3<f64>,
    /// (T) |B|
    pub magnitude: f64,
    /// (T/m) gradient of |B|
    pub gradient: Vector3<f64>,
}

/// Magnetic flux density of a single N-turn coil centered at the origin,
/// along with the gradient of the field magnitude.
///
/// The gradient is estimated by centered differences with half-step
/// h = max(1e-5, R * 1e-4) meters, two extra loop evaluations per axis.
/// Truncation error is O(h^2); the step is fixed rather than adaptively
/// refined since each call produces a single estimate, not an iterate.
///
/// # Arguments
///
/// * `point`: (m) observation point; the coil plane is x = 0
/// * `spec`:  coil geometry and drive; radius assumed > 0
pub fn flux_density_with_gradient(
    point: &Vector3<f64>,
    spec: &LoopSpec,
) -> Result<FieldSample, Error> {
    let b = flux_density_circular_loop(point, spec, 0.0)?;

    let h = (spec.radius * GRAD_STEP_PER_RADIUS).max(GRAD_STEP_FLOOR); // [m]

    let mut gradient = Vector3::zeros();
    for axis in 0..3 {
        let mut fwd = *point;
        let mut back = *point;
        fwd[axis] += h;
        back[axis] -= h;

        let mag_fwd = flux_density_circular_loop(&fwd, spec, 0.0)?.norm(); // [T]
        let mag_back = flux_density_circular_loop(&back, spec, 0.0)?.norm(); // [T]

        gradient[axis] = (mag_fwd - mag_back) / (2.0 * h); // [T/m]
    }

    Ok(FieldSample {
        b,
        magnitude: b.norm(),
        gradient,
    })
}

/// Caller-facing single-coil evaluation with centimeter geometry and a
/// direct current drive.
///
/// Inputs are validated here so that no field math runs on a rejected
/// configuration: positive radius, turn count at least 1, every numeric
/// input finite.
///
/// # Arguments
///
/// * `x_cm`, `y_cm`, `z_cm`: (cm) observation point
/// * `radius_cm`:            (cm) coil radius
/// * `current`:              (A) per-turn current
/// * `turns`:                number of turns, >= 1
pub fn single_coil_field_cm(
    x_cm: f64,
    y_cm: f64,
    z_cm: f64,
    radius_cm: f64,
    current: f64,
    turns: i32,
) -> Result<FieldSample, Error> {
    let spec = LoopSpec::from_cm(radius_cm, current, turns)?;
    let point = point_from_cm(x_cm, y_cm, z_cm)?;

    flux_density_with_gradient(&point, &spec)
}
