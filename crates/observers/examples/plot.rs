//! Interactive visualizations of multistep integrators.
//!
//! Each mode integrates a small system and opens an interactive plot window
//! comparing the numerical trajectory with the analytical one.
//!
//! # Usage
//!
//! ```text
//! cargo run --example plot --features plot -- oscillator
//! cargo run --example plot --features plot -- oscillator 0.5
//! cargo run --example plot --features plot -- decay
//! cargo run --example plot --features plot -- decay 0.4
//! ```
//!
//! # Modes
//!
//! - **oscillator [dt]** — Damped oscillator integrated with Newmark average
//!   acceleration and with central difference over 30 seconds. Larger steps
//!   show Newmark's period error; central difference goes unstable past
//!   `dt = 2`.
//!
//! - **decay [dt]** — `qdot = -q` integrated with AB-2, AM-2 and BDF-2 over
//!   5 seconds, against `e^-t`.

use std::{convert::Infallible, error::Error};

use multistep_core::{DMatrix, DVector, FirstOrderSystem, SecondOrderSystem};
use multistep_observers::{PlotObserver, Probe, ShowConfig};
use multistep_solvers::{
    integrator::Method,
    transient::{self, FirstOrderProblem, SecondOrderProblem},
};

fn main() -> Result<(), Box<dyn Error>> {
    let mode = std::env::args().nth(1).unwrap_or_else(|| "oscillator".into());
    let dt = std::env::args()
        .nth(2)
        .as_deref()
        .map(str::parse::<f64>)
        .transpose()
        .unwrap_or_else(|_| {
            eprintln!("Invalid step size, expected a number such as 0.1");
            std::process::exit(1);
        });

    match mode.as_str() {
        "oscillator" => oscillator(dt.unwrap_or(0.1)),
        "decay" => decay(dt.unwrap_or(0.25)),
        other => {
            eprintln!("Unknown mode: {other}");
            eprintln!("Usage: plot [oscillator [dt] | decay [dt]]");
            std::process::exit(1);
        }
    }
}

// --- Oscillator --------------------------------------------------------------

/// `qddot + 2ζω₀ qdot + ω₀² q = 0`
struct Oscillator {
    zeta: f64,
    omega0: f64,
}

impl Oscillator {
    fn damping(&self) -> f64 {
        2.0 * self.zeta * self.omega0
    }

    fn stiffness(&self) -> f64 {
        self.omega0.powi(2)
    }
}

impl SecondOrderSystem for Oscillator {
    type Error = Infallible;

    fn evaluate(
        &self,
        q: &DVector<f64>,
        qdot: &DVector<f64>,
        qddot: &mut DVector<f64>,
        _time: f64,
    ) -> Result<(), Infallible> {
        qddot.copy_from(&(-self.damping() * qdot - self.stiffness() * q));
        Ok(())
    }

    fn residue(
        &self,
        residue: &mut DVector<f64>,
        q: &DVector<f64>,
        qdot: &DVector<f64>,
        qddot: &DVector<f64>,
        _time: f64,
    ) -> Result<(), Infallible> {
        residue.copy_from(&(qddot + self.damping() * qdot + self.stiffness() * q));
        Ok(())
    }

    fn jacobian(
        &self,
        jacobian: &mut DMatrix<f64>,
        _q: &DVector<f64>,
        _qdot: &DVector<f64>,
        partial_qdot: f64,
        partial_qddot: f64,
        _time: f64,
    ) -> Result<(), Infallible> {
        jacobian[(0, 0)] = partial_qddot + self.damping() * partial_qdot + self.stiffness();
        Ok(())
    }
}

/// Integrate a damped oscillator with Newmark and central difference and
/// compare both to the analytical solution.
fn oscillator(dt: f64) -> Result<(), Box<dyn Error>> {
    let zeta = 0.1_f64;
    let omega0 = 1.0_f64;
    let omega_d = (omega0.powi(2) - zeta.powi(2)).sqrt();
    let system = Oscillator { zeta, omega0 };

    // x(t) = e^(-ζt) · [cos(ω_d·t) + (ζ/ω_d)·sin(ω_d·t)] for x(0)=1, v(0)=0
    let analytical = move |t: f64| {
        (-zeta * omega0 * t).exp()
            * ((omega_d * t).cos() + (zeta * omega0 / omega_d) * (omega_d * t).sin())
    };

    let mut obs = PlotObserver::<3>::new(["Newmark", "Central difference", "Analytical"])
        .with_probe(0, Probe::second(0, 0));

    let q0 = DVector::from_element(1, 1.0);
    let qdot0 = DVector::from_element(1, 0.0);

    let mut newmark = SecondOrderProblem::new(&system);
    newmark.set_integrator(Method::AVERAGE_ACCELERATION)?;
    newmark.set_initial_configuration(&q0, &qdot0)?;
    newmark.set_time_parameters(0.0, 30.0, dt)?;
    newmark.solve(&mut obs)?;

    let mut central = SecondOrderProblem::new(&system);
    central.set_integrator(Method::CentralDifference)?;
    central.set_initial_configuration(&q0, &qdot0)?;
    central.set_time_parameters(0.0, 30.0, dt)?;
    let probe = Probe::second(0, 0);
    central.solve(|event: &transient::Event<'_>| {
        obs.record(event.time, [None, probe.sample(event), None]);
        None
    })?;

    for i in 0_u32..=3000 {
        let t = 0.01 * f64::from(i);
        obs.record(t, [None, None, Some(analytical(t))]);
    }

    obs.show(
        ShowConfig::new()
            .title(format!("Damped oscillator (ζ = {zeta}, dt = {dt})"))
            .x_label("t")
            .legend(),
    )?;

    Ok(())
}

// --- Decay -------------------------------------------------------------------

/// `qdot = -q`
struct Decay;

impl FirstOrderSystem for Decay {
    type Error = Infallible;

    fn evaluate(&self, q: &DVector<f64>, qdot: &mut DVector<f64>, _time: f64) -> Result<(), Infallible> {
        qdot.copy_from(&(-q));
        Ok(())
    }

    fn residue(
        &self,
        residue: &mut DVector<f64>,
        q: &DVector<f64>,
        qdot: &DVector<f64>,
        _time: f64,
    ) -> Result<(), Infallible> {
        residue.copy_from(&(qdot + q));
        Ok(())
    }

    fn jacobian(
        &self,
        jacobian: &mut DMatrix<f64>,
        _q: &DVector<f64>,
        _qdot: &DVector<f64>,
        partial_qdot: f64,
        _time: f64,
    ) -> Result<(), Infallible> {
        jacobian[(0, 0)] = partial_qdot + 1.0;
        Ok(())
    }
}

/// Integrate `qdot = -q` with three second-order multistep schemes.
fn decay(dt: f64) -> Result<(), Box<dyn Error>> {
    let methods = [
        Method::AdamsBashforth(2),
        Method::AdamsMoulton(2),
        Method::Bdf(2),
    ];
    let mut obs = PlotObserver::<4>::new(["AB-2", "AM-2", "BDF-2", "Exact"]);
    let probe = Probe::first(0, 0);

    for (trace, method) in methods.into_iter().enumerate() {
        let mut problem = FirstOrderProblem::new(&Decay);
        problem.set_integrator(method)?;
        problem.set_initial_configuration(&DVector::from_element(1, 1.0))?;
        problem.set_time_parameters(0.0, 5.0, dt)?;
        problem.solve(|event: &transient::Event<'_>| {
            let mut values = [None; 4];
            values[trace] = probe.sample(event);
            obs.record(event.time, values);
            None
        })?;
    }

    for i in 0_u32..=500 {
        let t = 0.01 * f64::from(i);
        obs.record(t, [None, None, None, Some((-t).exp())]);
    }

    obs.show(
        ShowConfig::new()
            .title(format!("qdot = -q (dt = {dt})"))
            .x_label("t")
            .legend(),
    )?;

    Ok(())
}
