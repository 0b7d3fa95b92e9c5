// src/coefficient.rs
//
// Resolution of a material-coefficient description into per-site arrays.
//
// An interaction takes its coupling strength as a single number, a per-site
// array, a constant pair (for two-constant DMI classes), or a spatial
// function, and materialises it once at setup into `n_consts` planes of `n`
// values each. The numerical kernels only ever see the resolved planes, so
// they stay free of branching on the input shape.
//
// Layout: constant-major, `out[c * n + i]` is constant c at site i.

use crate::error::ConfigError;
use crate::mesh::Mesh;

/// Description of a per-site scalar coefficient (e.g. the DMI strength D in
/// J/m^2, or the exchange stiffness A in J/m).
pub enum CoefficientSpec {
    /// One value for every site and every constant.
    Uniform(f64),
    /// One value per independent constant; only valid for two-constant
    /// interactions.
    UniformPair(f64, f64),
    /// Explicit per-site values: either `n` entries (broadcast over the
    /// constants) or `n_consts * n` entries, constant-major.
    PerSite(Vec<f64>),
    /// Spatial function of the cell centre (x, y, z) in metres, broadcast
    /// over the constants.
    Function(Box<dyn Fn(f64, f64, f64) -> f64 + Send + Sync>),
    /// Spatial function returning both constants; only valid for
    /// two-constant interactions.
    FunctionPair(Box<dyn Fn(f64, f64, f64) -> (f64, f64) + Send + Sync>),
}

impl CoefficientSpec {
    /// Materialise `n_consts` per-site planes for `mesh`. Shape violations
    /// fail here, before any field computation.
    pub fn resolve(&self, mesh: &Mesh, n_consts: usize) -> Result<Vec<f64>, ConfigError> {
        let n = mesh.n_cells();
        match self {
            CoefficientSpec::Uniform(d) => Ok(vec![*d; n_consts * n]),

            CoefficientSpec::UniformPair(d1, d2) => {
                if n_consts != 2 {
                    return Err(ConfigError::CoefficientArity {
                        given: 2,
                        expected: n_consts,
                    });
                }
                let mut out = vec![*d1; 2 * n];
                out[n..].fill(*d2);
                Ok(out)
            }

            CoefficientSpec::PerSite(values) => {
                if values.len() == n_consts * n {
                    Ok(values.clone())
                } else if values.len() == n {
                    let mut out = Vec::with_capacity(n_consts * n);
                    for _ in 0..n_consts {
                        out.extend_from_slice(values);
                    }
                    Ok(out)
                } else {
                    Err(ConfigError::CoefficientLength {
                        got: values.len(),
                        expected: n_consts * n,
                        n_consts,
                        n,
                    })
                }
            }

            CoefficientSpec::Function(f) => {
                let mut out = Vec::with_capacity(n_consts * n);
                let plane: Vec<f64> = (0..n)
                    .map(|site| {
                        let [x, y, z] = mesh.cell_centre(site);
                        f(x, y, z)
                    })
                    .collect();
                for _ in 0..n_consts {
                    out.extend_from_slice(&plane);
                }
                Ok(out)
            }

            CoefficientSpec::FunctionPair(f) => {
                if n_consts != 2 {
                    return Err(ConfigError::CoefficientArity {
                        given: 2,
                        expected: n_consts,
                    });
                }
                let mut out = vec![0.0; 2 * n];
                for site in 0..n {
                    let [x, y, z] = mesh.cell_centre(site);
                    let (d1, d2) = f(x, y, z);
                    out[site] = d1;
                    out[n + site] = d2;
                }
                Ok(out)
            }
        }
    }
}

impl From<f64> for CoefficientSpec {
    fn from(d: f64) -> Self {
        CoefficientSpec::Uniform(d)
    }
}

impl From<(f64, f64)> for CoefficientSpec {
    fn from((d1, d2): (f64, f64)) -> Self {
        CoefficientSpec::UniformPair(d1, d2)
    }
}

impl From<Vec<f64>> for CoefficientSpec {
    fn from(values: Vec<f64>) -> Self {
        CoefficientSpec::PerSite(values)
    }
}
