//! Period measurement: zero crossings of θ.
//!
//! For a free, undamped pendulum the period grows with amplitude. The
//! crossing search measures it from the trajectory and compares it with the
//! small-angle value 2π/ω0 and the series T ≈ T0 (1 + θ0²/16).
//!
//! Run with:
//!   cargo run --example period_measurement

use std::f64::consts::PI;

use rk4_pendulum::{measure_period, DrivenPendulum, PendulumParameters};

fn main() -> rk4_pendulum::Result<()> {
    let omega0 = 1.0;
    let t0 = 2.0 * PI / omega0;

    println!("Free pendulum, ω0 = {omega0}, T0 = {t0:.6}");
    println!("  {:>6}  {:>12}  {:>12}", "θ0", "T measured", "T series");

    for theta0 in [0.05, 0.2, 0.5, 1.0, 2.0] {
        let params = PendulumParameters {
            omega0,
            alpha: 0.0,
            f_ext: 0.0,
            theta0,
            theta_dot0: 0.0,
            ..Default::default()
        };
        let period = measure_period(
            &DrivenPendulum,
            &params,
            0,
            0.0,
            &params.initial_state(),
            60.0,
            0.01,
        )?;
        match period {
            Some(t) => println!(
                "  {:>6.2}  {:>12.6}  {:>12.6}",
                theta0,
                t,
                t0 * (1.0 + theta0 * theta0 / 16.0)
            ),
            None => println!("  {:>6.2}  {:>12}", theta0, "no crossing"),
        }
    }
    Ok(())
}
