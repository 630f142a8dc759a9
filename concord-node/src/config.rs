//! Startup configuration.
//!
//! Parsing is out of scope for the core, but the shape of what gets read
//! once at startup is part of the ambient stack every node needs: own
//! peer id, the ordered peer list, and a debug/release flag. This is
//! carried as a `clap::Parser` struct, even though nothing in this
//! workspace yet turns `peers: Vec<String>` into live socket
//! connections — that's the transport's job, an external collaborator
//! here.
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Debug/release flag.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Environment {
    /// Production environment.
    Prod,
    /// Development environment.
    Dev,
}

/// Startup configuration for a single node.
#[derive(Parser, Debug)]
pub struct NodeConfig {
    /// This node's peer id. Its position is *not* inferred from `peers`;
    /// it is supplied explicitly so a node's id is stable independent of
    /// how its own entry is ordered in the peer list.
    #[clap(long, env = "CONCORD_NODE_ID")]
    pub id: u16,

    /// The ordered list of `host:port` peers; a peer's index in this list
    /// is its id.
    #[clap(long, env = "CONCORD_NODE_PEERS", value_delimiter = ',')]
    pub peers: Vec<String>,

    /// Production or development environment.
    #[clap(long, env = "CONCORD_NODE_ENVIRONMENT", default_value = "prod")]
    pub environment: Environment,

    /// Lower bound of the randomized election timeout range.
    #[clap(
        long,
        env = "CONCORD_NODE_ELECTION_TIMEOUT_MIN",
        default_value = "150ms",
        value_parser = humantime::parse_duration
    )]
    pub election_timeout_min: Duration,

    /// Upper bound of the randomized election timeout range.
    #[clap(
        long,
        env = "CONCORD_NODE_ELECTION_TIMEOUT_MAX",
        default_value = "300ms",
        value_parser = humantime::parse_duration
    )]
    pub election_timeout_max: Duration,

    /// Interval between leader heartbeats.
    #[clap(
        long,
        env = "CONCORD_NODE_HEARTBEAT_INTERVAL",
        default_value = "50ms",
        value_parser = humantime::parse_duration
    )]
    pub heartbeat_interval: Duration,
}

impl NodeConfig {
    /// Projects the timing fields into a [`concord_raft::TimingConfig`].
    pub fn timing(&self) -> concord_raft::TimingConfig {
        concord_raft::TimingConfig {
            election_timeout_min: self.election_timeout_min,
            election_timeout_max: self.election_timeout_max,
            heartbeat_interval: self.heartbeat_interval,
        }
    }
}
