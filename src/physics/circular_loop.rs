//! Magnetics calculations for N-turn circular current loops.
use std::num::NonZeroUsize;

use nalgebra::Vector3;
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::{ParallelSlice, ParallelSliceMut},
};

use crate::error::Error;
use crate::math::ellipke;
use crate::{MU0_OVER_4PI, MU_0};

/// (m/cm) conversion factor for the caller-facing centimeter interface.
const M_PER_CM: f64 = 1e-2;

/// Largest elliptic parameter passed through to the integrals. Observation
/// points on the loop wire itself drive m -> 1 where K diverges; the clamp
/// keeps the evaluation finite for geometry within ~1e-14 of the wire.
const M_MAX: f64 = 1.0 - 1e-14;

/// Geometry and drive of one N-turn circular loop.
///
/// Plain copyable data. [`LoopSpec::new`] checks the invariants (finite
/// radius > 0, finite current, at least one turn); the field routines assume
/// they hold rather than re-checking per evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopSpec {
    /// (m) loop radius, > 0
    pub radius: f64,
    /// (A) current in each turn
    pub current: f64,
    /// number of series turns; scales the field linearly
    pub turns: u32,
}

impl LoopSpec {
    /// Validated constructor with SI inputs.
    pub fn new(radius: f64, current: f64, turns: i32) -> Result<Self, Error> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::Validation("loop radius must be finite and > 0"));
        }
        if !current.is_finite() {
            return Err(Error::Validation("loop current must be finite"));
        }
        if turns < 1 {
            return Err(Error::Validation("turn count must be at least 1"));
        }

        Ok(Self {
            radius,
            current,
            turns: turns as u32,
        })
    }

    /// Validated constructor taking the radius in centimeters, the unit used
    /// at the caller-facing boundary.
    pub fn from_cm(radius_cm: f64, current: f64, turns: i32) -> Result<Self, Error> {
        Self::new(radius_cm * M_PER_CM, current, turns)
    }

    /// (A) net drive: per-turn current times turn count.
    #[inline]
    pub fn ampere_turns(&self) -> f64 {
        self.current * f64::from(self.turns)
    }
}

/// Observation point from caller-facing centimeter coordinates.
///
/// Converts to meters and rejects non-finite components so no field math
/// runs on bad input.
pub fn point_from_cm(x_cm: f64, y_cm: f64, z_cm: f64) -> Result<Vector3<f64>, Error> {
    if !(x_cm.is_finite() && y_cm.is_finite() && z_cm.is_finite()) {
        return Err(Error::Validation("observation point must be finite"));
    }

    Ok(Vector3::new(x_cm, y_cm, z_cm) * M_PER_CM)
}

/// Magnetic flux density of an N-turn circular loop at one observation point.
///
/// The loop axis is the x-axis and the loop center sits at `axial_offset`
/// along it, so the loop occupies the plane x = `axial_offset`.
///
/// # Arguments
///
/// * `point`:        (m) observation point in the loop frame
/// * `spec`:         loop geometry and drive; radius assumed > 0
/// * `axial_offset`: (m) loop center along the x-axis, 0 for a simple coil
///
/// Returns (T) flux density.
///
/// # Commentary
///
/// Near-exact closed form (except numerically-evaluated elliptic integrals).
/// The general formula divides by the radial distance rho from the axis, so
/// rho = 0 takes the on-axis closed form instead; the two branches agree in
/// the limit rho -> 0. Off axis, the elliptic parameter is clamped below 1
/// so that geometry exactly on the loop wire stays finite rather than
/// raising a domain error.
///
/// Note the formula for the radial component as given by \[1\] is incorrect
/// and does not satisfy the constraints of the calculation without
/// correcting by a factor of (z / rho).
///
/// # References
///
///   \[1\] D. B. Montgomery and J. Terrell,
///         “Some Useful Information For The Design Of Aircore Solenoids,”
///         Massachusetts Inst. Of Tech. Francis Bitter National Magnet Lab, Cambridge, MA,
///         Nov. 1961. Accessed: May 18, 2021. \[Online\].
///         Available: <https://apps.dtic.mil/sti/citations/tr/AD0269073>
///
///   \[2\] Eric Dennyson, "Magnet Formulas". Available: <https://tiggerntatie.github.io/emagnet-py/offaxis/off_axis_loop.html>
pub fn flux_density_circular_loop(
    point: &Vector3<f64>,
    spec: &LoopSpec,
    axial_offset: f64,
) -> Result<Vector3<f64>, Error> {
    let current = spec.ampere_turns(); // [A]
    let rfil = spec.radius; // [m]

    let zax = point.x - axial_offset; // [m] axial displacement from loop center
    let rho = point.y.hypot(point.z); // [m] radial distance from axis

    let z2 = zax * zax; // [m^2]

    // On the axis the general formula degenerates to 0/0; use the
    // elementary closed form for the axial component instead.
    if rho == 0.0 {
        let q = rfil.mul_add(rfil, z2); // [m^2]
        let bx = 0.5 * MU_0 * current * rfil * rfil / (q * q.sqrt()); // [T]
        return Ok(Vector3::new(bx, 0.0, 0.0));
    }

    let rho2 = rho * rho; // [m^2]
    let rpr = rfil + rho;

    let q = rpr.mul_add(rpr, z2); // [m^2]
    let m = (4.0 * rfil * rho / q).min(M_MAX); // [nondim]

    let (f, e) = ellipke(m)?;
    let s = e / (1.0 - m); // [nondim]

    let a0 = 2.0 * current / q.sqrt(); // [A/m]

    // Bake some reusable values
    let s_over_q = s / q; // [m^-2]
    let rfil2 = rfil * rfil; // [m^2]

    // Magnetic field intensity, less the factor of 4pi that we have adjusted out of mu_0
    let hrho = (zax / rho) * a0 * s_over_q.mul_add(rfil2 + rho2 + z2, -f);
    let hx = a0 * s_over_q.mul_add(rfil2 - rho2 - z2, f);

    // Project the radial component on to the y-z plane
    let cos_phi = point.y / rho; // [nondim]
    let sin_phi = point.z / rho; // [nondim]

    // Magnetic flux density assuming vacuum permeability
    Ok(MU0_OVER_4PI * Vector3::new(hx, hrho * cos_phi, hrho * sin_phi))
}

/// Flux density of one N-turn circular loop at many observation points.
///
/// # Arguments
///
/// * `spec`:         loop geometry and drive; radius assumed > 0
/// * `axial_offset`: (m) loop center along the x-axis
/// * `xyzp`:         (m) observation point coords, each length `n`
/// * `out`:          (T) bx, by, bz at observation points, each length `n`
pub fn flux_density_circular_loop_many(
    spec: &LoopSpec,
    axial_offset: f64,
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
        let b = flux_density_circular_loop(&Vector3::new(xp[j], yp[j], zp[j]), spec, axial_offset)?;
        bx[j] = b.x;
        by[j] = b.y;
        bz[j] = b.z;
    }

    Ok(())
}

/// Flux density of one N-turn circular loop at many observation points.
/// This variant of the function is parallelized over chunks of observation points.
///
/// # Arguments
///
/// * `spec`:         loop geometry and drive; radius assumed > 0
/// * `axial_offset`: (m) loop center along the x-axis
/// * `xyzp`:         (m) observation point coords, each length `n`
/// * `out`:          (T) bx, by, bz at observation points, each length `n`
pub fn flux_density_circular_loop_many_par(
    spec: &LoopSpec,
    axial_offset: f64,
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
            flux_density_circular_loop_many(spec, axial_offset, (xs, ys, zs), (bxs, bys, bzs))
        })?;

    Ok(())
}
