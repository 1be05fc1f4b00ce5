//! Attest Domain Layer
//!
//! Value types shared by every layer of the claim verification pipeline.
//! Nothing in this crate performs I/O; it only defines the records that the
//! knowledge extractor produces, the scanner and verifier exchange, and the
//! policy engine hands to the transport layer.
//!
//! ## Key Concepts
//!
//! - **Fact**: an atomic ground-truth datum derived from the knowledge source
//! - **Claim**: an atomic assertion found in generated text
//! - **Period / Tenure**: employment date ranges and their computed duration
//! - **VerificationResult**: one claim paired with its outcome
//! - **AuditThread**: the ordered, append-only trace of one evaluation
//! - **PolicyDecision**: the final verdict for one candidate response

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod claim;
pub mod decision;
pub mod fact;
pub mod period;
pub mod traits;
pub mod verification;

// Re-exports for convenience
pub use audit::{AuditEntry, AuditStatus, AuditThread};
pub use claim::{AssertedValue, Claim, TenureClaim, TextSpan};
pub use decision::{PolicyAction, PolicyDecision};
pub use fact::{normalize_subject, Fact, FactKind, FactSet};
pub use period::{Period, PeriodDate, PeriodEnd, Tenure};
pub use verification::{VerificationOutcome, VerificationResult};
