//! Prometheus counters for state-changing operations.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

pub const VOTE_TOGGLE: &str = "vote_toggle";
pub const COMMENT_ADD: &str = "comment_add";
pub const COMMENT_REPLY: &str = "comment_reply";
pub const COMMENT_UPDATE: &str = "comment_update";
pub const COMMENT_DELETE: &str = "comment_delete";
pub const PRODUCT_CREATE: &str = "product_create";
pub const PRODUCT_UPDATE: &str = "product_update";
pub const PRODUCT_DELETE: &str = "product_delete";
pub const USER_REGISTER: &str = "user_register";

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct MutationLabels {
    pub kind: String,
}

pub struct Metrics {
    registry: Registry,
    mutations: Family<MutationLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let mutations = Family::<MutationLabels, Counter>::default();
        registry.register(
            "launchpad_mutations",
            "Completed state-changing operations, by kind",
            mutations.clone(),
        );
        Self { registry, mutations }
    }

    pub fn record(&self, kind: &str) {
        self.mutations
            .get_or_create(&MutationLabels { kind: kind.to_owned() })
            .inc();
    }

    pub fn mutation_count(&self, kind: &str) -> u64 {
        self.mutations
            .get_or_create(&MutationLabels { kind: kind.to_owned() })
            .get()
    }

    /// OpenMetrics text exposition of the whole registry.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        encode(&mut buf, &self.registry)?;
        Ok(buf)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
