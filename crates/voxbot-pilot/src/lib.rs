//! Navigation and flight controllers: per-agent resumable state machines
//! that follow planned waypoint lists, re-plan when stuck, and manage glider
//! deployment, all within the host's synchronous per-tick call.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod control;
pub mod defaults;
pub mod flight;
pub mod navigate;
pub mod registry;

pub use control::ControlState;
pub use defaults::{NavDefaults, NavOverrides};
pub use flight::{FlightArrival, FlightFault};
pub use navigate::NavMode;
pub use registry::ControlSet;
