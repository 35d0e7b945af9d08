//! Property tests over randomly generated acyclic graphs

use proptest::prelude::*;
use proptest::sample::Index;

use graphdef_rewriter::graph::GraphIndex;
use graphdef_rewriter::names::format_ref;
use graphdef_rewriter::proto::NodeDef;

const OPS: &[&str] = &["Placeholder", "Const", "Identity", "Relu", "Add"];

/// Nodes `n0..nk`, each referencing only earlier nodes
fn arb_graph() -> impl Strategy<Value = Vec<NodeDef>> {
    let refs = prop::collection::vec((any::<Index>(), 0u32..3, any::<bool>()), 0..4);
    prop::collection::vec((0..OPS.len(), refs), 1..30).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (op, refs))| {
                let op = OPS[op];
                let source = i == 0 || op == "Const" || op == "Placeholder";
                let input = if source {
                    Vec::new()
                } else {
                    refs.into_iter()
                        .map(|(idx, port, control)| {
                            format_ref(&format!("n{}", idx.index(i)), port, control)
                        })
                        .collect()
                };
                NodeDef {
                    name: format!("n{}", i),
                    op: op.to_string(),
                    input,
                    ..Default::default()
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn build_dump_round_trip(nodes in arb_graph()) {
        let once = GraphIndex::build(nodes.clone()).dump();
        let twice = GraphIndex::build(once.clone()).dump();

        prop_assert_eq!(&once, &nodes);
        prop_assert_eq!(&twice, &nodes);
    }

    #[test]
    fn fresh_index_is_consistent(nodes in arb_graph()) {
        let index = GraphIndex::build(nodes);
        prop_assert!(index.check_consistency().is_ok());
    }

    #[test]
    fn splices_keep_adjacency_consistent(
        nodes in arb_graph(),
        picks in prop::collection::vec(any::<Index>(), 0..12),
    ) {
        let mut index = GraphIndex::build(nodes);

        for pick in picks {
            let names: Vec<String> = index.node_names().cloned().collect();
            if names.is_empty() {
                break;
            }
            let name = &names[pick.index(names.len())];
            let before = index.dump();

            match index.splice_single_input(name) {
                Ok(()) => {
                    prop_assert!(!index.has_node(name));
                    prop_assert_eq!(index.len(), before.len() - 1);
                    let check = index.check_consistency();
                    prop_assert!(check.is_ok(), "after splicing {}: {:?}", name, check);
                }
                Err(_) => {
                    prop_assert_eq!(index.dump(), before);
                }
            }
        }
    }

    #[test]
    fn replacements_keep_adjacency_consistent(
        nodes in arb_graph(),
        steps in prop::collection::vec(
            (any::<Index>(), any::<bool>(), any::<bool>(), prop::option::of(any::<Index>())),
            0..12,
        ),
    ) {
        let mut index = GraphIndex::build(nodes);

        for (step, (pick, rename, drop_first, extra)) in steps.into_iter().enumerate() {
            let names: Vec<String> = index.node_names().cloned().collect();
            let old = &names[pick.index(names.len())];

            let mut new = index.get_node(old).cloned().unwrap_or_default();
            new.op = "Replaced".to_string();
            if rename {
                new.name = format!("r{}", step);
            }
            if let Some(extra) = extra {
                new.input.push(names[extra.index(names.len())].clone());
            }

            let mut consumers: Vec<String> = index.consumers(old).to_vec();
            if drop_first && !consumers.is_empty() {
                consumers.remove(0);
            }
            let before = index.dump();

            match index.replace_node(new.clone(), old, consumers.as_slice()) {
                Ok(()) => {
                    prop_assert!(index.has_node(&new.name));
                    prop_assert_eq!(index.len(), before.len());
                    let check = index.check_consistency();
                    prop_assert!(check.is_ok(), "after replacing {}: {:?}", old, check);
                }
                Err(_) => {
                    prop_assert_eq!(index.dump(), before);
                }
            }
        }
    }

    #[test]
    fn insertions_keep_adjacency_consistent(
        nodes in arb_graph(),
        steps in prop::collection::vec(
            (any::<Index>(), any::<u8>(), prop::option::of(any::<Index>())),
            0..12,
        ),
    ) {
        let mut index = GraphIndex::build(nodes);

        for (step, (pick, mask, stray)) in steps.into_iter().enumerate() {
            let names: Vec<String> = index.node_names().cloned().collect();
            let producer = &names[pick.index(names.len())];

            let mut consumers: Vec<String> = index
                .consumers(producer)
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << (i % 8)) != 0)
                .map(|(_, c)| c.clone())
                .collect();
            if let Some(stray) = stray {
                let name = names[stray.index(names.len())].clone();
                if !consumers.contains(&name) {
                    consumers.push(name);
                }
            }

            let new = NodeDef {
                name: format!("ins{}", step),
                op: "Inserted".to_string(),
                input: vec![producer.clone()],
                ..Default::default()
            };
            let before = index.dump();

            match index.insert_node(new.clone(), Some(producer), consumers.as_slice()) {
                Ok(()) => {
                    prop_assert_eq!(index.len(), before.len() + 1);
                    for consumer in &consumers {
                        prop_assert!(index.consumers(&new.name).contains(consumer));
                        prop_assert!(!index.consumers(producer).contains(consumer));
                    }
                    let check = index.check_consistency();
                    prop_assert!(check.is_ok(), "after inserting at {}: {:?}", producer, check);
                }
                Err(_) => {
                    prop_assert_eq!(index.dump(), before);
                }
            }
        }
    }
}
