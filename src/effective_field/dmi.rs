// src/effective_field/dmi.rs
//
// Dzyaloshinskii–Moriya interaction (DMI) on the finite-difference mesh.
//
// Energy density per symmetry class:
//
//   bulk        :: w = D m · (∇ × m)               (class T, B20 compounds)
//   interfacial :: w = D ( L_xz^(x) + L_yz^(y) )   (Rohart et al., PRB 88, 184422)
//   D_2d        :: w = D ( L_xz^(y) + L_yz^(x) )   (stabilises anti-skyrmions)
//   D_n         :: two constants, in-plane D1 plus out-of-plane D2
//   C_n         :: two constants, interfacial-like D1 plus D_2d-like D2
//
// where L are Lifshitz invariants. Discretised, every neighbour direction
// carries a fixed DMI vector (tables below); the field at site i is
//
//   H_i = (2 / (mu0 Ms_i)) Σ_c Σ_dir D_c(i) v(c,dir) × m_j / h_dir
//
// summed over the valid neighbours j, with the coefficient taken at the
// source site i. The interfacial and D_2d classes carry zero vectors for the
// ±z directions: out-of-plane terms drop out by multiplication, not by a
// special-case branch.

use std::sync::Arc;

use rayon::prelude::*;

use crate::coefficient::CoefficientSpec;
use crate::error::ConfigError;
use crate::mesh::{Mesh, N_NEIGHBOURS};
use crate::params::{Saturation, MU0};
use crate::vec3::{cross, dot};
use crate::vector_field::VectorField;

use super::EnergyContribution;

/// The five supported DMI variant names, in the order accepted by
/// [`DmiVariant::from_name`].
pub const DMI_VARIANT_NAMES: [&str; 5] = ["bulk", "interfacial", "D_2d", "D_n", "C_n"];

/// DMI crystal-symmetry class. Fixed for the lifetime of a [`Dmi`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmiVariant {
    Bulk,
    Interfacial,
    D2d,
    Dn,
    Cn,
}

// Per-direction DMI vectors, 6 per independent constant, ordered
// -x, +x, -y, +y, -z, +z.

const DMI_VECTORS_BULK: [[f64; 3]; 6] = [
    [-1.0, 0.0, 0.0], // -x
    [1.0, 0.0, 0.0],  // +x
    [0.0, -1.0, 0.0], // -y
    [0.0, 1.0, 0.0],  // +y
    [0.0, 0.0, -1.0], // -z
    [0.0, 0.0, 1.0],  // +z
];

const DMI_VECTORS_INTERFACIAL: [[f64; 3]; 6] = [
    [0.0, -1.0, 0.0], // -x
    [0.0, 1.0, 0.0],  // +x
    [1.0, 0.0, 0.0],  // -y
    [-1.0, 0.0, 0.0], // +y
    [0.0, 0.0, 0.0],  // -z
    [0.0, 0.0, 0.0],  // +z
];

const DMI_VECTORS_D2D: [[f64; 3]; 6] = [
    [1.0, 0.0, 0.0],  // -x
    [-1.0, 0.0, 0.0], // +x
    [0.0, -1.0, 0.0], // -y
    [0.0, 1.0, 0.0],  // +y
    [0.0, 0.0, 0.0],  // -z
    [0.0, 0.0, 0.0],  // +z
];

const DMI_VECTORS_DN: [[f64; 3]; 12] = [
    // D1 components
    [1.0, 0.0, 0.0],  // -x
    [-1.0, 0.0, 0.0], // +x
    [0.0, -1.0, 0.0], // -y
    [0.0, 1.0, 0.0],  // +y
    [0.0, 0.0, 0.0],  // -z
    [0.0, 0.0, 0.0],  // +z
    // D2 components
    [0.0, 0.0, 0.0],  // -x
    [0.0, 0.0, 0.0],  // +x
    [0.0, 0.0, 0.0],  // -y
    [0.0, 0.0, 0.0],  // +y
    [0.0, 0.0, -1.0], // -z
    [0.0, 0.0, 1.0],  // +z
];

const DMI_VECTORS_CN: [[f64; 3]; 12] = [
    // D1 components
    [0.0, -1.0, 0.0], // -x
    [0.0, 1.0, 0.0],  // +x
    [1.0, 0.0, 0.0],  // -y
    [-1.0, 0.0, 0.0], // +y
    [0.0, 0.0, 0.0],  // -z
    [0.0, 0.0, 0.0],  // +z
    // D2 components
    [1.0, 0.0, 0.0],  // -x
    [-1.0, 0.0, 0.0], // +x
    [0.0, -1.0, 0.0], // -y
    [0.0, 1.0, 0.0],  // +y
    [0.0, 0.0, 0.0],  // -z
    [0.0, 0.0, 0.0],  // +z
];

impl DmiVariant {
    /// Parse an exact, case-sensitive variant name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "bulk" => Ok(Self::Bulk),
            "interfacial" => Ok(Self::Interfacial),
            "D_2d" => Ok(Self::D2d),
            "D_n" => Ok(Self::Dn),
            "C_n" => Ok(Self::Cn),
            other => Err(ConfigError::UnknownDmiVariant {
                found: other.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bulk => "bulk",
            Self::Interfacial => "interfacial",
            Self::D2d => "D_2d",
            Self::Dn => "D_n",
            Self::Cn => "C_n",
        }
    }

    /// Number of independent DMI constants for this class.
    pub fn n_consts(self) -> usize {
        match self {
            Self::Bulk | Self::Interfacial | Self::D2d => 1,
            Self::Dn | Self::Cn => 2,
        }
    }

    /// Fixed per-direction DMI vectors: 6 entries per constant, ordered
    /// -x, +x, -y, +y, -z, +z, constant-major.
    pub fn dmi_vectors(self) -> &'static [[f64; 3]] {
        match self {
            Self::Bulk => &DMI_VECTORS_BULK,
            Self::Interfacial => &DMI_VECTORS_INTERFACIAL,
            Self::D2d => &DMI_VECTORS_D2D,
            Self::Dn => &DMI_VECTORS_DN,
            Self::Cn => &DMI_VECTORS_CN,
        }
    }
}

/// Field (A/m) and energy density (J/m^3) at one site.
///
/// Pure in its inputs: sites can be evaluated in any order or in parallel.
/// The term order within a site is fixed (constants outer, directions
/// -x,+x,-y,+y,-z,+z inner) so results are bit-reproducible.
fn dmi_site(
    site: usize,
    m: &[[f64; 3]],
    sat: &Saturation,
    ds: &[f64],
    dmi_vectors: &[[f64; 3]],
    n_consts: usize,
    mesh: &Mesh,
) -> ([f64; 3], f64) {
    let ms_inv = sat.ms_inv[site];
    if ms_inv == 0.0 {
        return ([0.0; 3], 0.0);
    }

    let n = mesh.n_cells();
    let inv_h = mesh.inv_spacing();
    let neighbours = mesh.neighbours(site);
    let mut acc = [0.0f64; 3];

    for c in 0..n_consts {
        let d_i = ds[c * n + site];
        for dir in 0..N_NEIGHBOURS {
            // Missing or vacuum neighbours truncate the stencil; zero table
            // entries are multiplied through.
            let j = match neighbours[dir] {
                Some(j) if sat.ms_inv[j] != 0.0 => j,
                _ => continue,
            };
            let v = dmi_vectors[c * N_NEIGHBOURS + dir];
            let w = cross(v, m[j]);
            let s = d_i * inv_h[dir];
            acc[0] += s * w[0];
            acc[1] += s * w[1];
            acc[2] += s * w[2];
        }
    }

    let prefactor = 2.0 * ms_inv / MU0;
    let h = [prefactor * acc[0], prefactor * acc[1], prefactor * acc[2]];
    let e = -0.5 * MU0 * sat.ms[site] * dot(m[site], h);
    (h, e)
}

/// DMI energy contribution.
///
/// Construct with a coefficient description (J/m^2) and one of the variant
/// names in [`DMI_VARIANT_NAMES`]; an unrecognised name fails construction.
/// `setup` selects the stencil for the class and materialises the per-site
/// coefficient planes (one for bulk/interfacial/D_2d, two for D_n/C_n).
pub struct Dmi {
    name: String,
    variant: DmiVariant,
    d: CoefficientSpec,
    parallel: bool,
    mesh: Option<Arc<Mesh>>,
    saturation: Option<Arc<Saturation>>,
    ds: Vec<f64>,
    field: VectorField,
    energy: Vec<f64>,
}

impl std::fmt::Debug for Dmi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dmi")
            .field("name", &self.name)
            .field("variant", &self.variant)
            .field("parallel", &self.parallel)
            .field("ds", &self.ds)
            .field("energy", &self.energy)
            .finish_non_exhaustive()
    }
}

impl Dmi {
    pub fn new(d: impl Into<CoefficientSpec>, dmi_type: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            name: "DMI".to_string(),
            variant: DmiVariant::from_name(dmi_type)?,
            d: d.into(),
            parallel: false,
            mesh: None,
            saturation: None,
            ds: Vec::new(),
            field: VectorField::zeros(0),
            energy: Vec::new(),
        })
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Enable the rayon path for the per-site loop. Off by default; the env
    /// var `DMI_SIM_PAR` also enables it. Per-site outputs are disjoint, so
    /// both paths produce bit-identical results.
    pub fn with_parallel(mut self, on: bool) -> Self {
        self.parallel = on;
        self
    }

    pub fn variant(&self) -> DmiVariant {
        self.variant
    }

    /// Resolved per-site coefficient planes (constant-major), available
    /// after setup.
    pub fn coefficients(&self) -> &[f64] {
        &self.ds
    }
}

impl EnergyContribution for Dmi {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(
        &mut self,
        mesh: &Arc<Mesh>,
        saturation: &Arc<Saturation>,
    ) -> Result<(), ConfigError> {
        let n = mesh.n_cells();
        assert_eq!(
            saturation.len(),
            n,
            "saturation arrays do not match the mesh"
        );
        self.ds = self.d.resolve(mesh, self.variant.n_consts())?;
        self.field = VectorField::zeros(n);
        self.energy = vec![0.0; n];
        self.mesh = Some(Arc::clone(mesh));
        self.saturation = Some(Arc::clone(saturation));
        Ok(())
    }

    fn compute_field(&mut self, _t: f64, m: &VectorField) -> &VectorField {
        let mesh = Arc::clone(
            self.mesh
                .as_ref()
                .expect("Dmi::setup must run before compute_field"),
        );
        let sat = Arc::clone(self.saturation.as_ref().unwrap());
        assert_eq!(
            m.len(),
            mesh.n_cells(),
            "magnetisation length does not match the mesh"
        );

        let dmi_vectors = self.variant.dmi_vectors();
        let n_consts = self.variant.n_consts();
        let ds = &self.ds;

        let parallel = self.parallel || std::env::var("DMI_SIM_PAR").is_ok();
        if parallel {
            self.field
                .data
                .par_iter_mut()
                .zip(self.energy.par_iter_mut())
                .enumerate()
                .for_each(|(site, (h, e))| {
                    let (hi, ei) = dmi_site(site, &m.data, &sat, ds, dmi_vectors, n_consts, &mesh);
                    *h = hi;
                    *e = ei;
                });
        } else {
            for (site, (h, e)) in self
                .field
                .data
                .iter_mut()
                .zip(self.energy.iter_mut())
                .enumerate()
            {
                let (hi, ei) = dmi_site(site, &m.data, &sat, ds, dmi_vectors, n_consts, &mesh);
                *h = hi;
                *e = ei;
            }
        }

        &self.field
    }

    fn field(&self) -> &VectorField {
        &self.field
    }

    fn energy_density(&self) -> &[f64] {
        &self.energy
    }

    // DMI is linear in the neighbour magnetisation, so its Jacobian
    // contribution is available in closed form.
    fn provides_jacobian(&self) -> bool {
        true
    }
}
