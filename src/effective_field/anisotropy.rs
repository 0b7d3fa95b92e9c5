// src/effective_field/anisotropy.rs
//
// Uniaxial magnetocrystalline anisotropy.
//
// For w = K_u [1 - (m·u)^2]:
//   H_ani = (2 K_u / (mu0 M_s)) (m·u) u

use std::sync::Arc;

use crate::coefficient::CoefficientSpec;
use crate::error::ConfigError;
use crate::mesh::Mesh;
use crate::params::{Saturation, MU0};
use crate::vec3::{dot, normalize};
use crate::vector_field::VectorField;

use super::EnergyContribution;

pub struct UniaxialAnisotropy {
    name: String,
    ku: CoefficientSpec,
    axis: [f64; 3],
    mesh: Option<Arc<Mesh>>,
    saturation: Option<Arc<Saturation>>,
    ku_site: Vec<f64>,
    field: VectorField,
    energy: Vec<f64>,
}

impl UniaxialAnisotropy {
    /// Anisotropy constant Ku (J/m^3) and easy axis (normalised here).
    pub fn new(ku: impl Into<CoefficientSpec>, axis: [f64; 3]) -> Self {
        Self {
            name: "UniaxialAnisotropy".to_string(),
            ku: ku.into(),
            axis: normalize(axis),
            mesh: None,
            saturation: None,
            ku_site: Vec::new(),
            field: VectorField::zeros(0),
            energy: Vec::new(),
        }
    }
}

impl EnergyContribution for UniaxialAnisotropy {
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
        self.ku_site = self.ku.resolve(mesh, 1)?;
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
            .expect("UniaxialAnisotropy::setup must run before compute_field");
        let sat = self.saturation.as_ref().unwrap();
        assert_eq!(
            m.len(),
            mesh.n_cells(),
            "magnetisation length does not match the mesh"
        );

        let u = self.axis;
        for site in 0..mesh.n_cells() {
            let ms_inv = sat.ms_inv[site];
            if ms_inv == 0.0 {
                self.field.data[site] = [0.0; 3];
                self.energy[site] = 0.0;
                continue;
            }

            let mi = m.data[site];
            let mdotu = dot(mi, u);
            let coeff = 2.0 * self.ku_site[site] * ms_inv / MU0 * mdotu;
            self.field.data[site] = [coeff * u[0], coeff * u[1], coeff * u[2]];
            self.energy[site] = self.ku_site[site] * (1.0 - mdotu * mdotu);
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
