//! Electromagnetics calculations.
pub mod circular_loop;
pub mod helmholtz;
pub mod single_coil;

pub use circular_loop::{
    flux_density_circular_loop, flux_density_circular_loop_many,
    flux_density_circular_loop_many_par, point_from_cm, LoopSpec,
};
pub use helmholtz::{
    flux_density_helmholtz, flux_density_helmholtz_many, flux_density_helmholtz_many_par,
    helmholtz_field_cm,
};
pub use single_coil::{flux_density_with_gradient, single_coil_field_cm, FieldSample};
