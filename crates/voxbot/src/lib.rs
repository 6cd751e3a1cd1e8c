//! Umbrella crate that re-exports the `voxbot-*` building blocks.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use voxbot_core as core;

#[cfg(feature = "actions")]
#[cfg_attr(docsrs, doc(cfg(feature = "actions")))]
pub use voxbot_actions as actions;

#[cfg(feature = "nav")]
#[cfg_attr(docsrs, doc(cfg(feature = "nav")))]
pub use voxbot_nav as nav;

#[cfg(feature = "pilot")]
#[cfg_attr(docsrs, doc(cfg(feature = "pilot")))]
pub use voxbot_pilot as pilot;
