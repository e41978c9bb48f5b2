// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Support graphs: storage, construction from contacts, ground propagation,
//! and Graphviz export.

pub mod builder;
mod dot;
pub mod graph;
pub mod propagate;
