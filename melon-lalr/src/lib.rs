//! LR(0) state construction and LALR(1) follow-set propagation (§4.4).

#![deny(unsafe_code)]

pub mod automaton;
pub mod config;
pub mod error;
pub mod state;

pub use automaton::{build_states, Automaton};
pub use config::{ConfigRef, Configuration};
pub use error::LalrError;
pub use state::State;
