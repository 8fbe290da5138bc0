use criterion::{criterion_group, criterion_main, Criterion};
use ehmm_core::{EdgeHmm, HmmSolver};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_reestimate(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut hmm = EdgeHmm::new(8, 16).unwrap();
    hmm.randomize_uniform(&mut rng);
    let observations = hmm.sample_observations(200, &mut rng);

    c.bench_function("reestimate_8s_16o_t200", |b| {
        b.iter(|| {
            let mut solver = HmmSolver::new(hmm.clone(), &observations).unwrap();
            solver.reestimate().unwrap();
        })
    });

    c.bench_function("viterbi_8s_16o_t200", |b| {
        let solver = HmmSolver::new(hmm.clone(), &observations).unwrap();
        b.iter(|| solver.viterbi_decode())
    });
}

criterion_group!(benches, bench_reestimate);
criterion_main!(benches);
