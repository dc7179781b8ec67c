use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rk4_pendulum::{
    DataFileWriter, DrivenPendulum, OdeSystem, PendulumParameters, Rk4, RunConfig, SamplingPolicy,
    Simulation, TimeSpan,
};

/// Harmonic oscillator (2-state)
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

fn bench_harmonic_oscillator_1period(c: &mut Criterion) {
    let y0 = [1.0, 0.0];
    let period = 2.0 * std::f64::consts::PI;

    c.bench_function("harmonic_oscillator_1period", |b| {
        b.iter(|| {
            let mut solver = Rk4::new();
            solver
                .integrate(&HarmonicOscillator, &1.0, 0.0, black_box(&y0), period, 0.01)
                .unwrap()
        })
    });
}

fn bench_pendulum_step(c: &mut Criterion) {
    let params = PendulumParameters::default();
    let h = params.forcing_period() / 1000.0;

    c.bench_function("pendulum_1000_steps", |b| {
        b.iter(|| {
            let mut solver = Rk4::new();
            let mut y = params.initial_state();
            let mut t = 0.0;
            for _ in 0..1000 {
                solver.step(&DrivenPendulum, &params, t, &mut y, h);
                t += h;
            }
            black_box(y)
        })
    });
}

fn bench_default_run(c: &mut Criterion) {
    let sim = RunConfig::default().simulation().unwrap();

    c.bench_function("default_run_samples", |b| {
        b.iter(|| black_box(&sim).samples().count())
    });

    c.bench_function("default_run_to_file_buffer", |b| {
        b.iter(|| {
            let mut writer = DataFileWriter::new(Vec::with_capacity(1 << 16), &sim).unwrap();
            sim.run_into(&mut writer).unwrap();
            writer.into_inner().len()
        })
    });
}

fn bench_long_strobe_run(c: &mut Criterion) {
    let params = PendulumParameters {
        f_ext: 0.52,
        ..Default::default()
    };
    let policy = SamplingPolicy {
        plot_min: 0.0,
        plot_max: 1000.0,
        plot_skip: 10,
        strobe_skip: 1000,
    };
    let span = TimeSpan {
        t_min: 0.0,
        t_max: 1000.0,
    };
    let h = params.forcing_period() / f64::from(policy.strobe_skip);
    let sim = Simulation::new(params, policy, span, h).unwrap();

    c.bench_function("strobe_only_1000_time_units", |b| {
        b.iter(|| sim.samples().filter(|s| s.tag.is_strobe()).count())
    });
}

criterion_group!(
    benches,
    bench_harmonic_oscillator_1period,
    bench_pendulum_step,
    bench_default_run,
    bench_long_strobe_run
);
criterion_main!(benches);
