//! Action-table construction and conflict resolution (§4.5–§4.7).

#![deny(unsafe_code)]

pub mod action;

pub use action::{
    build_actions, compress_default_actions, Action, ActionKind, ActionTables, ActionTarget,
};
