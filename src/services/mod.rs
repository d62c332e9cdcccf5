//! Services module
//!
//! Business logic of the registry: the pure status calculator and renewal
//! accumulator, the owner ↔ vehicle relationship maintainer, and the injected
//! collaborators (actor resolution, activity logging) used by controllers.

pub mod actor_resolver;
pub mod audit;
pub mod ownership;
pub mod renewal_history;
pub mod status_sweeper;
pub mod vehicle_status;
