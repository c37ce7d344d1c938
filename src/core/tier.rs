//! Subscription tiers and the route capabilities they unlock

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Ordered subscription levels. Derived `Ord` follows declaration order,
/// so `Free < Basic < Pro < Admin` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Basic,
    Pro,
    Admin,
}

impl SubscriptionTier {
    /// Single comparison used for every access check in the application.
    pub fn allows(self, required: SubscriptionTier) -> bool {
        self >= required
    }
}

impl Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SubscriptionTier::Free => "free",
                SubscriptionTier::Basic => "basic",
                SubscriptionTier::Pro => "pro",
                SubscriptionTier::Admin => "admin",
            }
        )
    }
}

impl FromStr for SubscriptionTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "basic" => Ok(SubscriptionTier::Basic),
            "pro" => Ok(SubscriptionTier::Pro),
            "admin" => Ok(SubscriptionTier::Admin),
            _ => Err(anyhow::anyhow!("Invalid subscription tier: {}", s)),
        }
    }
}

/// Route capability tags. Each tag maps to the minimum tier that may use
/// it; route groups are gated on a capability, never on ad-hoc strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Portfolio,
    Analysis,
    Stocks,
    Backtesting,
    AdminPanel,
}

impl Capability {
    pub fn required_tier(self) -> SubscriptionTier {
        match self {
            Capability::Portfolio | Capability::Analysis | Capability::Stocks => {
                SubscriptionTier::Basic
            }
            Capability::Backtesting => SubscriptionTier::Pro,
            Capability::AdminPanel => SubscriptionTier::Admin,
        }
    }
}
