//! In-process N-peer simulation harness, used by this workspace's own
//! integration tests to exercise the Raft and DKG cores together without a
//! real network. A standalone crate that is itself nothing but test
//! infrastructure, depended on by other crates' `tests/` directories
//! rather than carrying any tests of its own logic.

mod sink;
mod transport;

use std::sync::{Arc, Once};
use std::time::Duration;

use concord_group::CryptoContext;
use concord_node::{NodeConfig, NodeHandle};
use num_bigint::BigUint;

pub use sink::RecordingClientSink;
pub use transport::{InMemoryTransport, Network};

static INIT_TRACING: Once = Once::new();

/// Installs a `tracing_subscriber::fmt` subscriber for test output, once
/// per process. Safe to call from every test; later calls are no-ops.
fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A toy crypto context small enough for fast tests, large enough that the
/// DKG/ZK math it backs stays meaningful (`p = 23`, a safe prime with
/// subgroup order `q = 11`, matching the one `concord-dkg`'s own unit tests
/// use).
pub fn toy_crypto_context() -> CryptoContext {
    CryptoContext::new(BigUint::from(23u32), BigUint::from(4u32))
        .expect("toy parameters are valid")
}

/// One simulated cluster member: its [`NodeHandle`] plus the sink that
/// records what got committed to it.
pub struct ClusterNode {
    pub id: u16,
    pub handle: Arc<NodeHandle>,
    pub sink: RecordingClientSink,
}

/// Builds an `n`-node cluster wired to a shared [`Network`], with fast,
/// fixed (non-randomized-by-environment) timing suited to deterministic
/// tests: a 40-80ms election timeout range and a 10ms heartbeat, scaled
/// down from the production defaults so a test's `pump`/`tick` loop
/// converges in a handful of iterations.
pub fn cluster(n: u16, network: &Network) -> Vec<ClusterNode> {
    init_tracing();
    let ctx = Arc::new(toy_crypto_context());
    (0..n)
        .map(|id| {
            let config = NodeConfig {
                id,
                peers: (0..n).map(|i| i.to_string()).collect(),
                environment: concord_node::config::Environment::Dev,
                election_timeout_min: Duration::from_millis(40),
                election_timeout_max: Duration::from_millis(80),
                heartbeat_interval: Duration::from_millis(10),
            };
            let sink = RecordingClientSink::new();
            let handle = Arc::new(
                NodeHandle::new(&config, ctx.clone(), network.transport_for(id), Arc::new(sink.clone()))
                    .expect("valid cluster config"),
            );
            network.register(id, handle.clone());
            ClusterNode { id, handle, sink }
        })
        .collect()
}

/// Ticks every node once, then pumps the network until quiescent. Repeated
/// calls are how a test advances simulated time: real election/heartbeat
/// timers still govern whether a given tick is a no-op, so this sleeps a
/// few milliseconds first — `tick` compares against real
/// [`std::time::Instant`] deadlines rather than a logical clock, and a
/// tight loop with no sleep would never cross them.
pub fn tick_and_pump(nodes: &[ClusterNode], network: &Network) {
    std::thread::sleep(Duration::from_millis(5));
    for node in nodes {
        node.handle.raft.tick();
    }
    network.pump();
}

/// Runs [`tick_and_pump`] until `done` holds or `max_rounds` is reached,
/// returning whether `done` was satisfied. Used to wait for an election to
/// converge without hardcoding a specific round count.
pub fn run_until(nodes: &[ClusterNode], network: &Network, max_rounds: usize, done: impl Fn(&[ClusterNode]) -> bool) -> bool {
    for _ in 0..max_rounds {
        if done(nodes) {
            return true;
        }
        tick_and_pump(nodes, network);
    }
    done(nodes)
}
