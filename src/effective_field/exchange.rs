// src/effective_field/exchange.rs
//
// Uniform Heisenberg exchange on the 6-neighbour stencil:
//
//   H_ex(i) = (2 A_i / (mu0 Ms_i)) Σ_j (m_j - m_i) / h_j^2
//
// with the stiffness A (J/m) taken at the source site. Missing or vacuum
// neighbours truncate the sum, the same policy as the DMI stencil.

use std::sync::Arc;

use crate::coefficient::CoefficientSpec;
use crate::error::ConfigError;
use crate::mesh::{Mesh, N_NEIGHBOURS};
use crate::params::{Saturation, MU0};
use crate::vec3::dot;
use crate::vector_field::VectorField;

use super::EnergyContribution;

pub struct UniformExchange {
    name: String,
    a: CoefficientSpec,
    mesh: Option<Arc<Mesh>>,
    saturation: Option<Arc<Saturation>>,
    a_site: Vec<f64>,
    field: VectorField,
    energy: Vec<f64>,
}

impl UniformExchange {
    pub fn new(a: impl Into<CoefficientSpec>) -> Self {
        Self {
            name: "UniformExchange".to_string(),
            a: a.into(),
            mesh: None,
            saturation: None,
            a_site: Vec::new(),
            field: VectorField::zeros(0),
            energy: Vec::new(),
        }
    }
}

impl EnergyContribution for UniformExchange {
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
        self.a_site = self.a.resolve(mesh, 1)?;
        self.field = VectorField::zeros(n);
        self.energy = vec![0.0; n];
        self.mesh = Some(Arc::clone(mesh));
        self.saturation = Some(Arc::clone(saturation));
        Ok(())
    }

    fn compute_field(&mut self, _t: f64, m: &VectorField) -> &VectorField {
        let mesh = self
            .mesh
            .as_ref()
            .expect("UniformExchange::setup must run before compute_field");
        let sat = self.saturation.as_ref().unwrap();
        assert_eq!(
            m.len(),
            mesh.n_cells(),
            "magnetisation length does not match the mesh"
        );

        let [dx, dy, dz] = mesh.spacings();
        let inv_h2 = [
            1.0 / (dx * dx),
            1.0 / (dx * dx),
            1.0 / (dy * dy),
            1.0 / (dy * dy),
            1.0 / (dz * dz),
            1.0 / (dz * dz),
        ];

        for site in 0..mesh.n_cells() {
            let ms_inv = sat.ms_inv[site];
            if ms_inv == 0.0 {
                self.field.data[site] = [0.0; 3];
                self.energy[site] = 0.0;
                continue;
            }

            let mi = m.data[site];
            let mut acc = [0.0f64; 3];
            for dir in 0..N_NEIGHBOURS {
                let j = match mesh.neighbour(site, dir) {
                    Some(j) if sat.ms_inv[j] != 0.0 => j,
                    _ => continue,
                };
                let mj = m.data[j];
                let w = inv_h2[dir];
                acc[0] += w * (mj[0] - mi[0]);
                acc[1] += w * (mj[1] - mi[1]);
                acc[2] += w * (mj[2] - mi[2]);
            }

            let prefactor = 2.0 * self.a_site[site] * ms_inv / MU0;
            let h = [prefactor * acc[0], prefactor * acc[1], prefactor * acc[2]];
            self.field.data[site] = h;
            self.energy[site] = -0.5 * MU0 * sat.ms[site] * dot(mi, h);
        }

        &self.field
    }

    fn field(&self) -> &VectorField {
        &self.field
    }

    fn energy_density(&self) -> &[f64] {
        &self.energy
    }
}
