#![allow(missing_docs)]

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use shardsim::{
    config::{LocalityConfig, RunConfig, StrategyKind},
    graph::InteractionGraph,
    partition::{assignment::Assignment, HashPartitioner, LocalityPartitioner, Partitioner},
    stream::{Call, Event, StreamProcessor},
};

fn calls() -> impl Strategy<Value = Vec<(u64, u64, u64)>> {
    prop::collection::vec((0..40u64, 0..40u64, 0..6u64), 1..80)
}

proptest! {
    #[test]
    fn edge_weight_is_the_sum_of_inserts(calls in calls()) {
        let mut g = InteractionGraph::new();
        let mut expected: HashMap<(u64, u64), u64> = HashMap::new();
        for &(u, v, w) in &calls {
            g.add_or_accumulate(u, v, w);
            *expected.entry((u, v)).or_insert(0) += w;
        }
        prop_assert_eq!(g.edge_count() as usize, expected.len());
        for (&(u, v), &w) in &expected {
            prop_assert_eq!(g.edge_weight(u, v), Some(w));
        }
    }

    #[test]
    fn assignment_grows_monotonically_and_balances(calls in calls()) {
        let g = InteractionGraph::new();
        let mut p = HashPartitioner::new(3);
        let mut a = Assignment::new();
        let mut prev_len = 0usize;
        for &(u, v, _) in &calls {
            let involved: BTreeSet<u64> = [u, v].into_iter().collect();
            p.assign_partition(&g, &mut a, &involved, 3);
            prop_assert!(a.len() >= prev_len, "assignment shrank");
            let top = *involved.iter().next_back().unwrap();
            prop_assert!(a.len() as u64 >= top + 1, "involved vertex left unassigned");
            prev_len = a.len();
        }
        prop_assert_eq!(p.balance().iter().sum::<u64>(), a.len() as u64);
        let hist = a.histogram(3);
        prop_assert_eq!(p.balance(), hist.as_slice());
    }

    #[test]
    fn locality_balance_matches_vector(calls in calls()) {
        let mut g = InteractionGraph::new();
        let mut p = LocalityPartitioner::new(4, LocalityConfig::default());
        let mut a = Assignment::new();
        for &(u, v, w) in &calls {
            g.add_or_accumulate(u, v, w);
            let involved: BTreeSet<u64> = [u, v].into_iter().collect();
            p.assign_partition(&g, &mut a, &involved, 4);
        }
        let hist = a.histogram(4);
        prop_assert_eq!(p.balance(), hist.as_slice());
    }

    #[test]
    fn replay_never_lets_cross_exceed_total(calls in calls(), nparts in 1..6u32) {
        let mut proc = StreamProcessor::new(
            RunConfig::new(nparts, 1_000, StrategyKind::Hash),
            Vec::new(),
        );
        proc.process(Event::Genesis { vertex: 1 }).unwrap();
        for chunk in calls.chunks(5) {
            let tx_calls: Vec<Call> = chunk
                .iter()
                .map(|&(u, v, w)| Call { from: u, to: v, weight: w })
                .collect();
            proc.process(Event::Transaction { author: chunk[0].0, calls: tx_calls }).unwrap();
            let s = proc.summary();
            prop_assert!(s.cross_edge_access <= s.total_edge_access);
        }
        let s = proc.summary();
        prop_assert_eq!(s.total_edge_access, calls.len() as u64);
        prop_assert_eq!(s.balance.iter().sum::<u64>(), s.vertices);
    }

    #[test]
    fn hash_assignment_is_id_mod_nparts(ids in prop::collection::btree_set(0..200u64, 1..40), nparts in 1..8u32) {
        let g = InteractionGraph::new();
        let mut p = HashPartitioner::new(nparts);
        let mut a = Assignment::new();
        p.assign_partition(&g, &mut a, &ids, nparts);
        for v in 0..a.len() as u64 {
            prop_assert_eq!(a.get(v), Some((v % u64::from(nparts)) as u32));
        }
    }

    #[test]
    fn hash_repartition_never_moves_vertices(ids in prop::collection::btree_set(0..100u64, 1..30), nparts in 1..5u32) {
        let mut g = InteractionGraph::new();
        for &v in &ids {
            g.add_or_accumulate(0, v, 1);
        }
        let mut p = HashPartitioner::new(nparts);
        let mut a = Assignment::new();
        p.assign_partition(&g, &mut a, &ids, nparts);
        let fresh = p.partition(&g, nparts);
        prop_assert_eq!(p.calculate_movements_repartition(&a, &fresh), 0);
    }
}
