use serde::{Deserialize, Serialize};

use crate::domain::donation::DEFAULT_POINTS_PER_DONATION;
use crate::domain::service::ServiceConfig;

/// Configuration for the donor_match module (`modules.donor_match`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DonorMatchConfig {
    #[serde(default = "default_points_per_donation")]
    pub points_per_donation: u32,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for DonorMatchConfig {
    fn default() -> Self {
        Self {
            points_per_donation: default_points_per_donation(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl From<&DonorMatchConfig> for ServiceConfig {
    fn from(cfg: &DonorMatchConfig) -> Self {
        Self {
            points_per_donation: cfg.points_per_donation,
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
            ..ServiceConfig::default()
        }
    }
}

fn default_points_per_donation() -> u32 {
    DEFAULT_POINTS_PER_DONATION
}

fn default_page_size() -> u32 {
    50
}

fn default_max_page_size() -> u32 {
    1000
}
