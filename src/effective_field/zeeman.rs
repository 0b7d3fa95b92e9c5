// src/effective_field/zeeman.rs
//
// Uniform applied (Zeeman) field. Energy density carries no 1/2 factor:
//   w = -mu0 M_s m · H_ext

use std::sync::Arc;

use crate::error::ConfigError;
use crate::mesh::Mesh;
use crate::params::{Saturation, MU0};
use crate::vec3::dot;
use crate::vector_field::VectorField;

use super::EnergyContribution;

pub struct Zeeman {
    name: String,
    h_ext: [f64; 3],
    saturation: Option<Arc<Saturation>>,
    field: VectorField,
    energy: Vec<f64>,
}

impl Zeeman {
    /// Applied field H_ext in A/m.
    pub fn new(h_ext: [f64; 3]) -> Self {
        Self {
            name: "Zeeman".to_string(),
            h_ext,
            saturation: None,
            field: VectorField::zeros(0),
            energy: Vec::new(),
        }
    }
}

impl EnergyContribution for Zeeman {
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
        self.field = VectorField::zeros(n);
        self.field
            .set_uniform(self.h_ext[0], self.h_ext[1], self.h_ext[2]);
        self.energy = vec![0.0; n];
        self.saturation = Some(Arc::clone(saturation));
        Ok(())
    }

    fn compute_field(&mut self, _t: f64, m: &VectorField) -> &VectorField {
        let sat = self
            .saturation
            .as_ref()
            .expect("Zeeman::setup must run before compute_field");
        assert_eq!(
            m.len(),
            self.field.len(),
            "magnetisation length does not match the mesh"
        );
        for (site, e) in self.energy.iter_mut().enumerate() {
            *e = -MU0 * sat.ms[site] * dot(m.data[site], self.h_ext);
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
