// src/driver.rs
//
// Driver selection and explicit time integration.
//
// A driver name resolves to one of a fixed set of integration schemes; the
// constructed driver owns the magnetisation, calls setup once per added
// interaction, and sums their fields once per force evaluation. Right-hand
// sides (g = (u·∇)m, gamma' = gamma/(1+alpha^2)):
//
//   llg         :: dm/dt = -gamma' m×H - gamma' alpha m×(m×H)
//   llg_stt     :: llg + Zhang-Li torque
//                  (1+alpha beta)/(1+alpha^2) m×(m×g) + (beta-alpha)/(1+alpha^2) m×g
//   llg_stt_cpp :: llg + fixed-polarizer torque
//                  -gamma' a_J m×(m×p) + gamma' b_J m×p
//   llbar       :: dm/dt = -gamma m×H + gamma lambda_r H
//   llbar_full  :: llbar - gamma lambda_e ∇²H
//
// The LLG-family schemes renormalise |m| = 1 after each explicit Euler
// step; the Baryakhtar schemes do not conserve |m| and skip it.

use std::sync::Arc;

use crate::effective_field::{build_h_eff, EnergyContribution};
use crate::error::ConfigError;
use crate::mesh::Mesh;
use crate::params::{Saturation, GAMMA};
use crate::vec3::{cross, normalize};
use crate::vector_field::VectorField;

/// Valid driver names, in the order reported by construction errors.
pub const KNOWN_DRIVERS: [&str; 5] = ["llg", "llg_stt", "llg_stt_cpp", "llbar", "llbar_full"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Llg,
    LlgStt,
    LlgSttCpp,
    LlBar,
    LlBarFull,
}

impl DriverKind {
    /// Resolve an exact, case-sensitive driver name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "llg" => Ok(Self::Llg),
            "llg_stt" => Ok(Self::LlgStt),
            "llg_stt_cpp" => Ok(Self::LlgSttCpp),
            "llbar" => Ok(Self::LlBar),
            "llbar_full" => Ok(Self::LlBarFull),
            other => Err(ConfigError::UnknownDriver {
                found: other.to_string(),
                valid: &KNOWN_DRIVERS,
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Llg => "llg",
            Self::LlgStt => "llg_stt",
            Self::LlgSttCpp => "llg_stt_cpp",
            Self::LlBar => "llbar",
            Self::LlBarFull => "llbar_full",
        }
    }
}

/// Parameters shared by the drivers. Entries a scheme does not consume are
/// ignored by it.
#[derive(Debug, Clone)]
pub struct DriverParams {
    /// Gyromagnetic ratio, m / (A s).
    pub gamma: f64,
    /// Gilbert damping.
    pub alpha: f64,
    /// Zhang-Li drift velocity u (m/s) and non-adiabaticity beta (llg_stt).
    pub u: [f64; 3],
    pub beta: f64,
    /// Fixed polarizer direction and torque strengths (llg_stt_cpp).
    pub p: [f64; 3],
    pub a_j: f64,
    pub b_j: f64,
    /// Baryakhtar relaxation constants (llbar, llbar_full).
    pub lambda_r: f64,
    pub lambda_e: f64,
}

impl Default for DriverParams {
    fn default() -> Self {
        Self {
            gamma: GAMMA,
            alpha: 0.01,
            u: [0.0; 3],
            beta: 0.0,
            p: [0.0, 0.0, 1.0],
            a_j: 0.0,
            b_j: 0.0,
            lambda_r: 0.0,
            lambda_e: 0.0,
        }
    }
}

pub struct Driver {
    kind: DriverKind,
    mesh: Arc<Mesh>,
    saturation: Arc<Saturation>,
    pub magnetization: VectorField,
    pub params: DriverParams,
    interactions: Vec<Box<dyn EnergyContribution>>,
    h_eff: VectorField,
    // (u·∇)m for llg_stt, ∇²H for llbar_full.
    scratch: VectorField,
    t: f64,
}

impl Driver {
    /// Resolve `driver` to an integration scheme and construct the driver
    /// around an initial magnetisation. Unknown names fail here.
    pub fn new(
        mesh: &Arc<Mesh>,
        saturation: &Arc<Saturation>,
        m0: VectorField,
        params: DriverParams,
        driver: &str,
    ) -> Result<Self, ConfigError> {
        let kind = DriverKind::from_name(driver)?;
        let n = mesh.n_cells();
        assert_eq!(m0.len(), n, "initial magnetisation does not match the mesh");
        assert_eq!(
            saturation.len(),
            n,
            "saturation arrays do not match the mesh"
        );
        Ok(Self {
            kind,
            mesh: Arc::clone(mesh),
            saturation: Arc::clone(saturation),
            magnetization: m0,
            params,
            interactions: Vec::new(),
            h_eff: VectorField::zeros(n),
            scratch: VectorField::zeros(n),
            t: 0.0,
        })
    }

    pub fn kind(&self) -> DriverKind {
        self.kind
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    /// Add an interaction term, running its setup against the bound mesh
    /// and saturation state.
    pub fn add(&mut self, mut term: Box<dyn EnergyContribution>) -> Result<(), ConfigError> {
        term.setup(&self.mesh, &self.saturation)?;
        self.interactions.push(term);
        Ok(())
    }

    pub fn interactions(&self) -> &[Box<dyn EnergyContribution>] {
        &self.interactions
    }

    /// Sum all interaction fields for the current magnetisation and return
    /// the total effective field.
    pub fn effective_field(&mut self) -> &VectorField {
        build_h_eff(
            self.t,
            &self.magnetization,
            &mut self.h_eff,
            &mut self.interactions,
        );
        &self.h_eff
    }

    /// Total energy (J) over the mesh from each term's last evaluation.
    pub fn total_energy(&self) -> f64 {
        let dv = self.mesh.cell_volume();
        self.interactions
            .iter()
            .map(|term| term.energy_density().iter().sum::<f64>())
            .sum::<f64>()
            * dv
    }

    /// Advance one explicit Euler step of the selected scheme.
    pub fn step(&mut self, dt: f64) {
        build_h_eff(
            self.t,
            &self.magnetization,
            &mut self.h_eff,
            &mut self.interactions,
        );

        match self.kind {
            DriverKind::LlgStt => directional_derivative(
                &self.mesh,
                &self.saturation,
                &self.magnetization,
                self.params.u,
                &mut self.scratch,
            ),
            DriverKind::LlBarFull => {
                laplacian(&self.mesh, &self.saturation, &self.h_eff, &mut self.scratch)
            }
            _ => {}
        }

        let p = &self.params;
        let inv = 1.0 / (1.0 + p.alpha * p.alpha);
        let renormalise = matches!(
            self.kind,
            DriverKind::Llg | DriverKind::LlgStt | DriverKind::LlgSttCpp
        );

        for site in 0..self.mesh.n_cells() {
            if self.saturation.ms_inv[site] == 0.0 {
                continue;
            }

            let mv = self.magnetization.data[site];
            let h = self.h_eff.data[site];
            let mxh = cross(mv, h);

            let mut dmdt = match self.kind {
                DriverKind::Llg | DriverKind::LlgStt | DriverKind::LlgSttCpp => {
                    let mxmxh = cross(mv, mxh);
                    [
                        -p.gamma * inv * (mxh[0] + p.alpha * mxmxh[0]),
                        -p.gamma * inv * (mxh[1] + p.alpha * mxmxh[1]),
                        -p.gamma * inv * (mxh[2] + p.alpha * mxmxh[2]),
                    ]
                }
                DriverKind::LlBar | DriverKind::LlBarFull => [
                    -p.gamma * mxh[0] + p.gamma * p.lambda_r * h[0],
                    -p.gamma * mxh[1] + p.gamma * p.lambda_r * h[1],
                    -p.gamma * mxh[2] + p.gamma * p.lambda_r * h[2],
                ],
            };

            match self.kind {
                DriverKind::LlgStt => {
                    let g = self.scratch.data[site];
                    let mxg = cross(mv, g);
                    let mxmxg = cross(mv, mxg);
                    let adiabatic = (1.0 + p.alpha * p.beta) * inv;
                    let non_adiabatic = (p.beta - p.alpha) * inv;
                    for c in 0..3 {
                        dmdt[c] += adiabatic * mxmxg[c] + non_adiabatic * mxg[c];
                    }
                }
                DriverKind::LlgSttCpp => {
                    let mxp = cross(mv, p.p);
                    let mxmxp = cross(mv, mxp);
                    for c in 0..3 {
                        dmdt[c] +=
                            p.gamma * inv * (-p.a_j * mxmxp[c] + p.b_j * mxp[c]);
                    }
                }
                DriverKind::LlBarFull => {
                    let lap = self.scratch.data[site];
                    for c in 0..3 {
                        dmdt[c] -= p.gamma * p.lambda_e * lap[c];
                    }
                }
                _ => {}
            }

            let m_new = [
                mv[0] + dt * dmdt[0],
                mv[1] + dt * dmdt[1],
                mv[2] + dt * dmdt[2],
            ];
            self.magnetization.data[site] = if renormalise {
                normalize(m_new)
            } else {
                m_new
            };
        }

        self.t += dt;
    }
}

/// g = (u·∇)m: central differences in the interior, one-sided against a
/// boundary or vacuum neighbour, zero where no neighbour exists at all.
fn directional_derivative(
    mesh: &Mesh,
    sat: &Saturation,
    m: &VectorField,
    u: [f64; 3],
    out: &mut VectorField,
) {
    let h = mesh.spacings();
    for site in 0..mesh.n_cells() {
        if sat.ms_inv[site] == 0.0 {
            out.data[site] = [0.0; 3];
            continue;
        }

        let mi = m.data[site];
        let mut g = [0.0f64; 3];
        for axis in 0..3 {
            let ua = u[axis];
            if ua == 0.0 {
                continue;
            }
            let minus = mesh
                .neighbour(site, 2 * axis)
                .filter(|&j| sat.ms_inv[j] != 0.0);
            let plus = mesh
                .neighbour(site, 2 * axis + 1)
                .filter(|&j| sat.ms_inv[j] != 0.0);

            let d = match (minus, plus) {
                (Some(a), Some(b)) => {
                    let (ma, mb) = (m.data[a], m.data[b]);
                    let w = 1.0 / (2.0 * h[axis]);
                    [(mb[0] - ma[0]) * w, (mb[1] - ma[1]) * w, (mb[2] - ma[2]) * w]
                }
                (None, Some(b)) => {
                    let mb = m.data[b];
                    let w = 1.0 / h[axis];
                    [(mb[0] - mi[0]) * w, (mb[1] - mi[1]) * w, (mb[2] - mi[2]) * w]
                }
                (Some(a), None) => {
                    let ma = m.data[a];
                    let w = 1.0 / h[axis];
                    [(mi[0] - ma[0]) * w, (mi[1] - ma[1]) * w, (mi[2] - ma[2]) * w]
                }
                (None, None) => [0.0; 3],
            };
            g[0] += ua * d[0];
            g[1] += ua * d[1];
            g[2] += ua * d[2];
        }
        out.data[site] = g;
    }
}

/// ∇²f on the 6-neighbour stencil, truncated at boundaries and vacuum.
fn laplacian(mesh: &Mesh, sat: &Saturation, f: &VectorField, out: &mut VectorField) {
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
        if sat.ms_inv[site] == 0.0 {
            out.data[site] = [0.0; 3];
            continue;
        }
        let fi = f.data[site];
        let mut acc = [0.0f64; 3];
        for dir in 0..6 {
            let j = match mesh.neighbour(site, dir) {
                Some(j) if sat.ms_inv[j] != 0.0 => j,
                _ => continue,
            };
            let fj = f.data[j];
            let w = inv_h2[dir];
            acc[0] += w * (fj[0] - fi[0]);
            acc[1] += w * (fj[1] - fi[1]);
            acc[2] += w * (fj[2] - fi[2]);
        }
        out.data[site] = acc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effective_field::zeeman::Zeeman;
    use crate::params::MU0;

    fn macrospin() -> (Arc<Mesh>, Arc<Saturation>) {
        let mesh = Arc::new(Mesh::new(1, 1, 1, 1e-9, 1e-9, 1e-9));
        let sat = Arc::new(Saturation::uniform(&mesh, 8.0e5));
        (mesh, sat)
    }

    #[test]
    fn unknown_driver_fails_with_the_valid_choices() {
        let err = DriverKind::from_name("rk4").unwrap_err();
        let msg = err.to_string();
        for name in KNOWN_DRIVERS {
            assert!(msg.contains(name), "message should list {}: {}", name, msg);
        }
    }

    #[test]
    fn all_known_driver_names_construct() {
        let (mesh, sat) = macrospin();
        for name in KNOWN_DRIVERS {
            let m0 = VectorField::new(&mesh);
            let driver =
                Driver::new(&mesh, &sat, m0, DriverParams::default(), name).unwrap();
            assert_eq!(driver.kind().name(), name);
        }
    }

    #[test]
    fn llg_macrospin_precesses_about_the_applied_field() {
        let (mesh, sat) = macrospin();
        let mut m0 = VectorField::zeros(1);
        m0.data[0] = [1.0, 0.0, 0.0];

        // H equivalent to 0.1 T, along +z; no damping.
        let h0 = 0.1 / MU0;
        let params = DriverParams {
            alpha: 0.0,
            ..Default::default()
        };
        let mut driver = Driver::new(&mesh, &sat, m0, params, "llg").unwrap();
        driver.add(Box::new(Zeeman::new([0.0, 0.0, h0]))).unwrap();

        // Quarter period: t = (pi/2) / (gamma H).
        let dt = 1e-14;
        let t_target = std::f64::consts::FRAC_PI_2 / (GAMMA * h0);
        let n_steps = (t_target / dt).round() as usize;
        for _ in 0..n_steps {
            driver.step(dt);
        }

        let v = driver.magnetization.data[0];
        assert!(v[2].abs() < 0.1, "m_z should stay ~0, got {}", v[2]);
        assert!(v[1].abs() > 0.9, "|m_y| should be large, got {}", v[1]);
        assert!((driver.time() - t_target).abs() < 2.0 * dt);
    }

    #[test]
    fn llg_damping_aligns_magnetisation_with_the_field() {
        let (mesh, sat) = macrospin();
        let mut m0 = VectorField::zeros(1);
        m0.data[0] = normalize([0.6, 0.0, 0.8]);

        let params = DriverParams {
            alpha: 0.5,
            ..Default::default()
        };
        let mut driver = Driver::new(&mesh, &sat, m0, params, "llg").unwrap();
        driver
            .add(Box::new(Zeeman::new([0.0, 0.0, 0.1 / MU0])))
            .unwrap();

        for _ in 0..60_000 {
            driver.step(1e-14);
        }
        let v = driver.magnetization.data[0];
        assert!(v[2] > 0.99, "m should align with +z, got mz={}", v[2]);
        // LLG conserves |m|.
        let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn llbar_relaxation_does_not_conserve_magnetisation_length() {
        let (mesh, sat) = macrospin();
        let mut m0 = VectorField::zeros(1);
        m0.data[0] = [1.0, 0.0, 0.0];

        let params = DriverParams {
            alpha: 0.0,
            lambda_r: 0.05,
            ..Default::default()
        };
        let mut driver = Driver::new(&mesh, &sat, m0, params, "llbar").unwrap();
        driver
            .add(Box::new(Zeeman::new([0.0, 0.0, 0.1 / MU0])))
            .unwrap();

        for _ in 0..1000 {
            driver.step(1e-14);
        }
        let v = driver.magnetization.data[0];
        let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert!(
            (norm - 1.0).abs() > 1e-6,
            "llbar should let |m| drift, got {}",
            norm
        );
        // The longitudinal relaxation pulls m toward the field axis.
        assert!(v[2] > 0.0);
    }

    #[test]
    fn stt_drivers_step_without_spurious_torque_on_uniform_m() {
        // (u·∇)m = 0 for uniform m, so llg_stt reduces to llg; with a_j =
        // b_j = 0 the same holds for llg_stt_cpp.
        let mesh = Arc::new(Mesh::new(4, 1, 1, 1e-9, 1e-9, 1e-9));
        let sat = Arc::new(Saturation::uniform(&mesh, 8.0e5));

        for name in ["llg_stt", "llg_stt_cpp"] {
            let mut m0 = VectorField::zeros(4);
            m0.set_uniform(0.0, 0.0, 1.0);
            let params = DriverParams {
                alpha: 0.1,
                u: [50.0, 0.0, 0.0],
                beta: 0.04,
                ..Default::default()
            };
            let mut driver = Driver::new(&mesh, &sat, m0, params, name).unwrap();
            // No interactions: H = 0, and the current-induced terms see a
            // uniform texture.
            for _ in 0..100 {
                driver.step(1e-13);
            }
            for v in &driver.magnetization.data {
                assert_eq!(*v, [0.0, 0.0, 1.0], "{}", name);
            }
        }
    }

    #[test]
    fn directional_derivative_is_central_in_the_interior() {
        let mesh = Mesh::new(3, 1, 1, 2.0, 1.0, 1.0);
        let sat = Saturation::uniform(&mesh, 1.0);
        let mut m = VectorField::zeros(3);
        m.data[0] = [0.0, 0.0, 0.0];
        m.data[1] = [1.0, 0.0, 0.0];
        m.data[2] = [4.0, 0.0, 0.0];

        let mut g = VectorField::zeros(3);
        directional_derivative(&mesh, &sat, &m, [1.0, 0.0, 0.0], &mut g);
        // Interior: (m_2 - m_0)/(2 dx) = 1; edges one-sided.
        assert_eq!(g.data[1], [1.0, 0.0, 0.0]);
        assert_eq!(g.data[0], [0.5, 0.0, 0.0]);
        assert_eq!(g.data[2], [1.5, 0.0, 0.0]);
    }
}
