//! Strobe stream: one sample per forcing period.
//!
//! With h = T_ext / strobe_skip the strobe stream samples the pendulum at
//! the same forcing phase every period. A periodic attractor shows up as a
//! few repeating points; chaotic motion scatters.
//!
//! Run with:
//!   cargo run --example strobe_section

use rk4_pendulum::{PendulumParameters, SamplingPolicy, Simulation, TimeSpan};

fn main() {
    let span = TimeSpan {
        t_min: 0.0,
        t_max: 600.0,
    };
    // Skip the transient: only the last 300 time units are sampled.
    let policy = SamplingPolicy {
        plot_min: 300.0,
        plot_max: span.t_max,
        plot_skip: 10,
        strobe_skip: 200,
    };

    for f_ext in [0.2, 0.52] {
        let params = PendulumParameters {
            f_ext,
            ..Default::default()
        };
        let h = params.forcing_period() / f64::from(policy.strobe_skip);
        let sim = Simulation::new(params, policy, span, h).unwrap();

        println!("f_ext = {f_ext}");
        println!("  {:>10}  {:>12}  {:>12}", "t", "θ", "θ'");
        for sample in sim.samples().filter(|s| s.tag.is_strobe()).take(8) {
            // Wrap θ into (-π, π] so rotations do not hide the section.
            let theta = (sample.theta + std::f64::consts::PI)
                .rem_euclid(2.0 * std::f64::consts::PI)
                - std::f64::consts::PI;
            println!(
                "  {:>10.3}  {:>12.6}  {:>12.6}",
                sample.t, theta, sample.theta_dot
            );
        }
        println!();
    }
}
