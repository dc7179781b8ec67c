//! Basic RK4 usage: harmonic oscillator.
//!
//! Integrates y'' + ω²y = 0 for one period and compares with the exact solution.
//!
//! Run with:
//!   cargo run --example harmonic_oscillator

use rk4_pendulum::{OdeSystem, Rk4};

/// Simple harmonic oscillator: y'' + ω²y = 0
///
/// State vector: [y, y']
struct HarmonicOscillator;

impl OdeSystem<2> for HarmonicOscillator {
    type Params = f64;

    fn derivative(&self, _t: f64, y: &[f64; 2], i: usize, omega: &f64) -> f64 {
        match i {
            0 => y[1],
            _ => -omega * omega * y[0],
        }
    }
}

fn main() {
    let omega = 2.0;

    // Integrate for one full period: T = 2π/ω
    let period = 2.0 * std::f64::consts::PI / omega;
    let y0 = [1.0, 0.0]; // y(0) = 1, y'(0) = 0

    println!("Harmonic Oscillator (ω = {omega})");
    println!("  Period: {period:.6} s");
    println!();
    println!("  {:>8}  {:>12}  {:>12}  {:>8}", "h", "|y - y_ex|", "|y' - y'_ex|", "steps");

    for h in [0.1, 0.05, 0.025, 0.0125] {
        let mut solver = Rk4::new();
        let (tf, yf) = solver
            .integrate(&HarmonicOscillator, &omega, 0.0, &y0, period, h)
            .unwrap();

        // Exact solution: y(t) = cos(ωt), y'(t) = -ω sin(ωt)
        let y_exact = (omega * tf).cos();
        let v_exact = -omega * (omega * tf).sin();

        println!(
            "  {:>8.4}  {:>12.3e}  {:>12.3e}  {:>8}",
            h,
            (yf[0] - y_exact).abs(),
            (yf[1] - v_exact).abs(),
            solver.stats.steps
        );
    }
    println!();
    println!("  Halving h divides the error by about 16 (global order 4).");
}
