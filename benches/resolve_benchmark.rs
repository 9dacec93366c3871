use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scaffolder::{
    resolve_component, scaffold, ContigSizes, LinkGraph, LinkRecord, Orientation, ScaffoldConfig,
    Strand,
};

fn random_strand(rng: &mut StdRng) -> Strand {
    if rng.gen_bool(0.5) {
        Strand::Forward
    } else {
        Strand::Reverse
    }
}

// A chain of `n` contigs with `degree` links per contig and a few bad orientations.
fn make_component(n: usize, degree: usize, seed: u64) -> (Vec<LinkRecord>, ContigSizes) {
    let mut rng = StdRng::seed_from_u64(seed);
    let names: Vec<String> = (0..n).map(|i| format!("ctg{i:06}")).collect();
    let sizes: ContigSizes = names
        .iter()
        .map(|name| (name.clone(), rng.gen_range(500..20_000u64)))
        .collect();

    let mut records = Vec::with_capacity(n * degree);
    for i in 0..n.saturating_sub(1) {
        for k in 0..degree {
            let j = (i + 1 + k).min(n - 1);
            if j == i {
                continue;
            }
            let code = Orientation::new(random_strand(&mut rng), random_strand(&mut rng));
            let distance = rng.gen_range(0..5_000i64);
            records.push(LinkRecord::new(names[i].clone(), names[j].clone(), code, distance));
        }
    }
    (records, sizes)
}

fn bench_resolve(c: &mut Criterion) {
    let config = ScaffoldConfig::default();
    let mut group = c.benchmark_group("resolve_component");
    for &n in &[100usize, 1_000, 5_000] {
        let (records, sizes) = make_component(n, 3, 123);
        let component = LinkGraph::from_records(&records, config.min_distance)
            .components()
            .remove(0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &component, |b, component| {
            b.iter(|| {
                let _ = resolve_component(component.clone(), &sizes, &config);
            })
        });
    }
    group.finish();
}

fn bench_scaffold(c: &mut Criterion) {
    let config = ScaffoldConfig::default();
    let mut records = Vec::new();
    let mut sizes = ContigSizes::new();
    for seed in 0..50u64 {
        let (mut batch, batch_sizes) = make_component(40, 2, seed);
        for record in batch.iter_mut() {
            record.contig_a = format!("s{seed}_{}", record.contig_a);
            record.contig_b = format!("s{seed}_{}", record.contig_b);
        }
        for id in batch_sizes.ids() {
            if let Some(length) = batch_sizes.get(id) {
                sizes.insert(format!("s{seed}_{id}"), length);
            }
        }
        records.append(&mut batch);
    }

    c.bench_function("scaffold_50_components", |b| {
        b.iter(|| {
            let _ = scaffold(&records, &sizes, &config);
        })
    });
}

criterion_group!(benches, bench_resolve, bench_scaffold);
criterion_main!(benches);
