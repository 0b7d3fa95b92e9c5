// src/effective_field/mod.rs
//
// Effective-field contributions (H_eff, A/m) that the drivers sum.
// Each term owns its output buffers and overwrites them on every
// compute_field call; the driver accumulates them into one field.

pub mod anisotropy;
pub mod dmi;
pub mod exchange;
pub mod zeeman;

use std::sync::Arc;

use crate::error::ConfigError;
use crate::mesh::Mesh;
use crate::params::Saturation;
use crate::vector_field::VectorField;

/// One interaction term of the micromagnetic energy.
///
/// Lifecycle: `setup` binds the term to a mesh and saturation state exactly
/// once; `compute_field` may then be called repeatedly with magnetisation
/// snapshots supplied by the driver. The output buffers are overwritten,
/// never accumulated across calls, and the inputs are never mutated.
pub trait EnergyContribution {
    /// Interaction name used in diagnostics.
    fn name(&self) -> &str;

    /// Bind mesh geometry and material arrays and materialise any per-site
    /// coefficients. Shape violations fail here.
    fn setup(&mut self, mesh: &Arc<Mesh>, saturation: &Arc<Saturation>)
        -> Result<(), ConfigError>;

    /// Recompute the effective field (A/m) for the magnetisation snapshot
    /// `m` at time `t` (seconds) and return it.
    fn compute_field(&mut self, t: f64, m: &VectorField) -> &VectorField;

    /// Field from the last compute_field call.
    fn field(&self) -> &VectorField;

    /// Energy density (J/m^3) from the last compute_field call.
    fn energy_density(&self) -> &[f64];

    /// Whether this term can supply an analytic Jacobian contribution to an
    /// implicit solver's linearisation.
    fn provides_jacobian(&self) -> bool {
        false
    }
}

/// Build the total effective field: zero `h_eff`, then add every term's
/// freshly computed field into it.
pub fn build_h_eff(
    t: f64,
    m: &VectorField,
    h_eff: &mut VectorField,
    interactions: &mut [Box<dyn EnergyContribution>],
) {
    h_eff.fill_zero();
    for term in interactions.iter_mut() {
        let f = term.compute_field(t, m);
        h_eff.add_assign(f);
    }
}
