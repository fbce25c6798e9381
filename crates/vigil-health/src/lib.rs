//! vigil-health — the check → decision → remediation → notification engine.
//!
//! One sweep evaluates every configured target once. Per target, the
//! cycle is a small state machine:
//!
//! ```text
//! CHECKING ──healthy──────────────▶ IDLE (nothing further)
//!    │
//!    ├──unhealthy──▶ REMEDIATING ──▶ NOTIFYING
//!    │
//!    └──check error──────────────▶ NOTIFYING
//! ```
//!
//! Remediation is attempted only for a clean Unhealthy verdict. A check
//! error means the cause is ambiguous (connectivity vs. service state),
//! and restarting blind is worse than waiting a cycle.
//!
//! No history is kept between cycles; every sweep judges the fleet fresh.

pub mod checker;
pub mod remediate;
pub mod report;
pub mod sweep;

pub use checker::{CheckResult, CheckStatus, Checker};
pub use remediate::{RemediationOutcome, RemediationResult, Remediator};
pub use sweep::{Sweeper, TargetReport};
