//! Per-tick discrete action scheduler: a per-agent registry of concurrently
//! active actions (use, attack, jump, drop, swap), each with its own timing
//! policy.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod kind;
pub mod pack;
pub mod timer;

pub use kind::ActionKind;
pub use pack::ActionPack;
pub use timer::ActionTimer;
