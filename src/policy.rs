//! Restart and backoff policy interpretation
//!
//! The file declares how an external supervisor should restart a crashed
//! process. This module interprets those fields as pure math so tooling can
//! answer "what would the supervisor do" without supervising anything.

use std::time::Duration;

use crate::errors::Result;
use crate::schema::AppConfig;

/// Upper bound on the exponential backoff delay, in milliseconds
pub const BACKOFF_CAP_MS: u64 = 15_000;

/// Uptime below which a run counts as unstable when no min_uptime is set
pub const DEFAULT_MIN_UPTIME_MS: u64 = 1_000;

/// Restart policy distilled from one app entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartPolicy {
    pub autorestart: bool,
    pub max_restarts: Option<u32>,
    pub min_uptime_ms: u64,
    pub restart_delay_ms: Option<u64>,
    pub backoff_base_ms: Option<u64>,
}

/// What the declared policy says should happen after an exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartVerdict {
    /// Restart after the given delay
    Restart { delay: Duration },
    /// Autorestart is disabled for this app
    Disabled,
    /// The unstable-restart budget is exhausted
    LimitReached { max_restarts: u32 },
}

impl RestartPolicy {
    /// Extract the policy fields from an app entry
    pub fn from_app(app: &AppConfig) -> Result<Self> {
        let min_uptime_ms = match &app.min_uptime {
            Some(field) => field.as_millis()?,
            None => DEFAULT_MIN_UPTIME_MS,
        };
        Ok(Self {
            autorestart: app.autorestart,
            max_restarts: app.max_restarts,
            min_uptime_ms,
            restart_delay_ms: app.restart_delay,
            backoff_base_ms: app.exp_backoff_restart_delay,
        })
    }

    /// Whether a run that lasted `uptime` counts as unstable
    pub fn is_unstable(&self, uptime: Duration) -> bool {
        (uptime.as_millis() as u64) < self.min_uptime_ms
    }

    /// Delay the supervisor is asked to wait before restart number
    /// `unstable_restarts` (zero-based count of consecutive unstable runs).
    ///
    /// Exponential backoff doubles from its base and is capped; otherwise
    /// the fixed restart_delay applies, defaulting to an immediate restart.
    pub fn delay_before_restart(&self, unstable_restarts: u32) -> Duration {
        let ms = match (self.backoff_base_ms, self.restart_delay_ms) {
            (Some(base), _) => {
                let factor = 2u64.saturating_pow(unstable_restarts.min(63));
                base.saturating_mul(factor).min(BACKOFF_CAP_MS)
            }
            (None, Some(fixed)) => fixed,
            (None, None) => 0,
        };
        Duration::from_millis(ms)
    }

    /// Decide what the policy dictates after an exit, given how many
    /// consecutive unstable restarts have already happened and how long the
    /// last run stayed up.
    pub fn verdict(&self, unstable_restarts: u32, last_uptime: Duration) -> RestartVerdict {
        if !self.autorestart {
            return RestartVerdict::Disabled;
        }
        // A stable run resets the unstable counter
        let count = if self.is_unstable(last_uptime) {
            unstable_restarts
        } else {
            0
        };
        if let Some(max) = self.max_restarts {
            if count >= max {
                return RestartVerdict::LimitReached { max_restarts: max };
            }
        }
        RestartVerdict::Restart {
            delay: self.delay_before_restart(count),
        }
    }
}
