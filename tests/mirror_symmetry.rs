//! Randomised checks that mirrored link evidence resolves to the mirrored
//! arrangement and flags the same edges.

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    use scaffolder::{
        resolve_component, ContigSizes, LinkGraph, LinkRecord, Orientation, ScaffoldConfig,
        Strand,
    };

    struct Truth {
        names: Vec<String>,
        lengths: Vec<u64>,
        strands: Vec<Strand>,
        lefts: Vec<i64>,
    }

    // Contigs laid end to end in name order with random strands and gaps.
    fn random_truth(rng: &mut StdRng, n: usize) -> Truth {
        let mut lefts = Vec::with_capacity(n);
        let mut lengths = Vec::with_capacity(n);
        let mut cursor = 0i64;
        for _ in 0..n {
            let length = rng.gen_range(100..2000u64);
            lefts.push(cursor);
            lengths.push(length);
            cursor += length as i64 + rng.gen_range(50..400i64);
        }
        Truth {
            names: (0..n).map(|i| format!("ctg{i:03}")).collect(),
            lengths,
            strands: (0..n)
                .map(|_| {
                    if rng.gen_bool(0.5) {
                        Strand::Forward
                    } else {
                        Strand::Reverse
                    }
                })
                .collect(),
            lefts,
        }
    }

    fn truthful_link(truth: &Truth, i: usize, j: usize) -> LinkRecord {
        let (left, right) = if truth.lefts[i] < truth.lefts[j] {
            (i, j)
        } else {
            (j, i)
        };
        let gap = truth.lefts[right] - (truth.lefts[left] + truth.lengths[left] as i64);
        LinkRecord::new(
            truth.names[left].clone(),
            truth.names[right].clone(),
            Orientation::new(truth.strands[left], truth.strands[right]),
            gap,
        )
    }

    // A shuffled spanning chain plus extra truthful links between random pairs.
    fn consistent_records(rng: &mut StdRng, truth: &Truth, extra: usize) -> Vec<LinkRecord> {
        let n = truth.names.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);
        let mut records: Vec<LinkRecord> = order
            .windows(2)
            .map(|w| truthful_link(truth, w[0], w[1]))
            .collect();
        for _ in 0..extra {
            let i = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            if i != j {
                records.push(truthful_link(truth, i, j));
            }
        }
        records
    }

    fn mirror(records: &[LinkRecord]) -> Vec<LinkRecord> {
        records
            .iter()
            .map(|r| {
                LinkRecord::new(
                    r.contig_a.clone(),
                    r.contig_b.clone(),
                    r.orientation.flipped(),
                    r.distance,
                )
            })
            .collect()
    }

    fn sizes_of(truth: &Truth) -> ContigSizes {
        truth
            .names
            .iter()
            .cloned()
            .zip(truth.lengths.iter().copied())
            .collect()
    }

    fn left_ends(signs: &[Strand], positions: &[f64], lengths: &[u64]) -> Vec<f64> {
        signs
            .iter()
            .zip(positions)
            .zip(lengths)
            .map(|((strand, &p), &len)| match strand {
                Strand::Forward => p,
                Strand::Reverse => p - len as f64,
            })
            .collect()
    }

    #[test]
    fn test_consistent_evidence_mirrors_layout() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = ScaffoldConfig::default();
        for round in 0..20 {
            let n = rng.gen_range(2..25);
            let truth = random_truth(&mut rng, n);
            let records = consistent_records(&mut rng, &truth, n);
            let sizes = sizes_of(&truth);

            let direct = LinkGraph::from_records(&records, config.min_distance)
                .components()
                .remove(0);
            let mirrored = LinkGraph::from_records(&mirror(&records), config.min_distance)
                .components()
                .remove(0);
            let direct = resolve_component(direct, &sizes, &config).unwrap();
            let mirrored = resolve_component(mirrored, &sizes, &config).unwrap();

            assert!(direct.signs.violated.is_empty(), "round {round}");
            assert!(direct.positions.discarded.is_empty(), "round {round}");
            assert_eq!(direct.signs, mirrored.signs, "round {round}");
            assert_eq!(direct.positions.discarded, mirrored.positions.discarded);

            // [L, L+len) maps to [-L-len, -L), anchored on node 0.
            let lengths = &truth.lengths;
            let l = left_ends(&direct.signs.signs, &direct.positions.positions, lengths);
            let m = left_ends(&mirrored.signs.signs, &mirrored.positions.positions, lengths);
            for i in 0..n {
                let expected = -(l[i] + lengths[i] as f64) + (l[0] + lengths[0] as f64);
                assert!(
                    (m[i] - m[0] - expected).abs() < 1e-4,
                    "round {round} node {i}: {} vs {expected}",
                    m[i] - m[0]
                );
            }

            let forward: Vec<&str> = direct.layout.order().map(|(c, _)| c).collect();
            let mut backward: Vec<&str> = mirrored.layout.order().map(|(c, _)| c).collect();
            backward.reverse();
            assert_eq!(forward, backward, "round {round}");
            assert_eq!(direct.layout.span(), mirrored.layout.span());
        }
    }

    #[test]
    fn test_noisy_evidence_flags_same_edges() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = ScaffoldConfig::default();
        for round in 0..20 {
            let n = rng.gen_range(3..30);
            let truth = random_truth(&mut rng, n);
            let mut records = consistent_records(&mut rng, &truth, n / 2);
            for _ in 0..rng.gen_range(1..=n) {
                let i = rng.gen_range(0..n);
                let j = rng.gen_range(0..n);
                if i == j {
                    continue;
                }
                let mut noisy = truthful_link(&truth, i, j);
                noisy.orientation = Orientation::new(
                    noisy.orientation.first,
                    noisy.orientation.second.flip(),
                );
                records.push(noisy);
            }
            records.shuffle(&mut rng);
            let sizes = sizes_of(&truth);

            let direct = LinkGraph::from_records(&records, config.min_distance)
                .components()
                .remove(0);
            let mirrored = LinkGraph::from_records(&mirror(&records), config.min_distance)
                .components()
                .remove(0);
            let direct = resolve_component(direct, &sizes, &config).unwrap();
            let mirrored = resolve_component(mirrored, &sizes, &config).unwrap();

            assert_eq!(direct.signs, mirrored.signs, "round {round}");
            assert_eq!(
                direct.positions.discarded, mirrored.positions.discarded,
                "round {round}"
            );
            assert_eq!(direct.positions.pieces, mirrored.positions.pieces);
            assert_eq!(direct.layout.len(), n);
            assert_eq!(mirrored.layout.len(), n);
        }
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let mut rng = StdRng::seed_from_u64(1234);
        let truth = random_truth(&mut rng, 40);
        let records = consistent_records(&mut rng, &truth, 60);
        let sizes = sizes_of(&truth);
        let config = ScaffoldConfig::default();

        let graph = LinkGraph::from_records(&records, config.min_distance);
        let first = resolve_component(graph.components().remove(0), &sizes, &config).unwrap();
        let second = resolve_component(graph.components().remove(0), &sizes, &config).unwrap();
        assert_eq!(first, second);
    }
}
