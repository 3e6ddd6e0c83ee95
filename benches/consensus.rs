use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use poagraph::{Alignment, Graph};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

fn simulated_reads(len: usize, count: usize, seed: u64) -> Vec<Vec<u8>> {
    let bases = b"ACGT";
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
    let template: Vec<u8> = (0..len)
        .filter_map(|_| bases.choose(&mut rng))
        .copied()
        .collect();
    let mut reads = vec![template.clone()];
    for _ in 1..count {
        let mut read = template.clone();
        for _ in 0..3 {
            let site = rng.gen_range(0..read.len());
            let alternatives: Vec<u8> = bases
                .iter()
                .copied()
                .filter(|&base| base != read[site])
                .collect();
            read[site] = *alternatives.choose(&mut rng).unwrap();
        }
        reads.push(read);
    }
    reads
}

fn identity_alignment(len: usize) -> Alignment {
    let ids: Vec<i32> = (0..len as i32).collect();
    Alignment::from_indices(&ids, &ids).unwrap()
}

fn build_graph(reads: &[Vec<u8>]) -> Graph {
    let mut graph = Graph::from_sequence(&reads[0], 1.0).unwrap();
    let alignment = identity_alignment(reads[0].len());
    for read in &reads[1..] {
        graph.add_alignment(&alignment, read, 1.0).unwrap();
    }
    graph
}

fn bench_msa_and_consensus(c: &mut Criterion) {
    let reads = simulated_reads(250, 20, 0x5eed);
    c.bench_function("incorporate_20x250", |b| {
        b.iter(|| build_graph(&reads));
    });
    c.bench_function("msa_with_consensus_20x250", |b| {
        b.iter_batched(
            || build_graph(&reads),
            |mut graph| graph.generate_msa(true).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_msa_and_consensus);
criterion_main!(benches);
