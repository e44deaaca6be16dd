//! Scheduling engines over the query gateway.
//!
//! Two stateless computation layers: recurrence expansion
//! ([`scheduling::recurrence`]) and cross-calendar conflict detection with
//! availability search ([`scheduling::conflict`]). Every operation is a
//! pure function of its inputs plus reads through [`gateway::QueryGateway`];
//! nothing here writes, locks, or spawns.

pub mod error;
pub mod gateway;
pub mod scheduling;
