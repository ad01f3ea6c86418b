//! Quorum consensus domain
//!
//! Verification and validation are both gates: an odd panel of agents votes,
//! and a strict majority decides.
//!
//! ```text
//! ┌───────────────┐   votes    ┌────────────┐   verdict   ┌──────────────┐
//! │ panel members │ ─────────▶ │ PanelRule  │ ──────────▶ │ GateVerdict  │
//! │ (odd count)   │  in order  │ (majority) │             │ (immutable)  │
//! └───────────────┘            └────────────┘             └──────────────┘
//! ```
//!
//! Replies are turned into votes by the tag extractors in [`parsing`].

pub mod consensus;
pub mod parsing;
pub mod rule;
pub mod vote;

// Re-export main types
pub use consensus::{ConsensusOutcome, GateKind, GateVerdict};
pub use parsing::{ExtractedVerdict, extract_output, extract_tag, extract_verdict};
pub use rule::PanelRule;
pub use vote::{UNPARSEABLE_MESSAGE, Vote};
