//! Tunable operational defaults and well-known label keys.

/// Default node label key carrying a node's availability zone.
pub const LABEL_ZONE_FAILURE_DOMAIN: &str = "failure-domain.beta.kubernetes.io/zone";

/// Default node label key carrying a node's region.
pub const LABEL_REGION_FAILURE_DOMAIN: &str = "failure-domain.beta.kubernetes.io/region";

/// Channel buffer size for the membership command queue.
pub const DEFAULT_MEMBERSHIP_CHANNEL_SIZE: usize = 256;
