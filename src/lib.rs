// SPDX-License-Identifier: MIT

//! Condition-matching engine for ticket assignment and escalation rules

pub mod config;
pub mod engine;
pub mod tickets;
