//! Superposed loop fields for the Helmholtz pair configuration.
use std::num::NonZeroUsize;

use nalgebra::Vector3;
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::{ParallelSlice, ParallelSliceMut},
};

use crate::error::Error;
use crate::physics::circular_loop::{flux_density_circular_loop, point_from_cm, LoopSpec};

/// Magnetic flux density of a Helmholtz pair at one observation point.
///
/// Two identical coaxial N-turn loops with centers at -R/2 and +R/2 on the
/// x-axis, the standard Helmholtz spacing equal to the loop radius. The
/// result is the exact vector sum of the two loop fields; superposition
/// introduces no approximation because the field is linear in current.
///
/// # Arguments
///
/// * `point`: (m) observation point; the pair midplane sits at x = 0
/// * `spec`:  per-loop geometry and drive; radius assumed > 0
///
/// Returns (T) flux density.
pub fn flux_density_helmholtz(
    point: &Vector3<f64>,
    spec: &LoopSpec,
) -> Result<Vector3<f64>, Error> {
    let half_spacing = 0.5 * spec.radius; // [m]

    let lower = flux_density_circular_loop(point, spec, -half_spacing)?;
    let upper = flux_density_circular_loop(point, spec, half_spacing)?;

    Ok(lower + upper)
}

/// Caller-facing Helmholtz evaluation: centimeter geometry and a
/// voltage/resistance drive.
///
/// The loop current is derived as I = V / Ω. Inputs are validated here so
/// that no field math runs on a rejected configuration: the radius must be
/// positive, the resistance positive, the turn count at least 1, and every
/// numeric input finite.
///
/// # Arguments
///
/// * `x_cm`, `y_cm`, `z_cm`: (cm) observation point
/// * `radius_cm`:            (cm) radius of each loop
/// * `voltage`:              (V) supply voltage
/// * `resistance`:           (Ω) total winding resistance, > 0
/// * `turns`:                number of turns per loop, >= 1
///
/// Returns (T) flux density.
pub fn helmholtz_field_cm(
    x_cm: f64,
    y_cm: f64,
    z_cm: f64,
    radius_cm: f64,
    voltage: f64,
    resistance: f64,
    turns: i32,
) -> Result<Vector3<f64>, Error> {
    if !resistance.is_finite() || resistance <= 0.0 {
        return Err(Error::Validation("resistance must be finite and > 0"));
    }
    if !voltage.is_finite() {
        return Err(Error::Validation("voltage must be finite"));
    }

    let spec = LoopSpec::from_cm(radius_cm, voltage / resistance, turns)?;
    let point = point_from_cm(x_cm, y_cm, z_cm)?;

    flux_density_helmholtz(&point, &spec)
}

/// Flux density of a Helmholtz pair at many observation points.
///
/// # Arguments
///
/// * `spec`: per-loop geometry and drive; radius assumed > 0
/// * `xyzp`: (m) observation point coords, each length `n`
/// * `out`:  (T) bx, by, bz at observation points, each length `n`
pub fn flux_density_helmholtz_many(
    spec: &LoopSpec,
    xyzp: (&[f64], &[f64], &[f64]),
    out: (&mut [f64], &mut [f64], &mut [f64]),
) -> Result<(), Error> {
    let (xp, yp, zp) = xyzp;
    let (bx, by, bz) = out;

    // Check lengths; Error if they do not match
    let n = xp.len();
    if yp.len() != n || zp.len() != n || bx.len() != n || by.len() != n || bz.len() != n {
        return Err(Error::Validation("input length mismatch"));
    }

    for j in 0..n {
        let b = flux_density_helmholtz(&Vector3::new(xp[j], yp[j], zp[j]), spec)?;
        bx[j] = b.x;
        by[j] = b.y;
        bz[j] = b.z;
    }

    Ok(())
}

/// Flux density of a Helmholtz pair at many observation points.
/// This variant of the function is parallelized over chunks of observation points.
///
/// # Arguments
///
/// * `spec`: per-loop geometry and drive; radius assumed > 0
/// * `xyzp`: (m) observation point coords, each length `n`
/// * `out`:  (T) bx, by, bz at observation points, each length `n`
pub fn flux_density_helmholtz_many_par(
    spec: &LoopSpec,
    xyzp: (&[f64], &[f64], &[f64]),
    out: (&mut [f64], &mut [f64], &mut [f64]),
) -> Result<(), Error> {
    let (xp, yp, zp) = xyzp;
    let (bx, by, bz) = out;

    let n = xp.len();
    if yp.len() != n || zp.len() != n || bx.len() != n || by.len() != n || bz.len() != n {
        return Err(Error::Validation("input length mismatch"));
    }

    // Chunk inputs
    let ncores = std::thread::available_parallelism()
        .unwrap_or(NonZeroUsize::MIN)
        .get();

    let nchunk = (n / ncores).max(1);

    let xc = xp.par_chunks(nchunk);
    let yc = yp.par_chunks(nchunk);
    let zc = zp.par_chunks(nchunk);

    let bxc = bx.par_chunks_mut(nchunk);
    let byc = by.par_chunks_mut(nchunk);
    let bzc = bz.par_chunks_mut(nchunk);

    // Run calcs
    bxc.zip(byc.zip(bzc))
        .zip(xc.zip(yc.zip(zc)))
        .try_for_each(|((bxs, (bys, bzs)), (xs, (ys, zs)))| {
            flux_density_helmholtz_many(spec, (xs, ys, zs), (bxs, bys, bzs))
        })?;

    Ok(())
}
