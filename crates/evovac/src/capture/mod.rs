//! Detection and capture of collectibles.
//!
//! [`vacuum::Vacuum`] composes the pieces: [`acquisition::TargetAcquisition`]
//! picks a candidate every visual tick, [`session::CaptureStateMachine`] pulls
//! the engaged item through its phases, and [`resources::ResourcePool`] decides
//! whether it may be stored. All physical effects go through the
//! [`physics::PhysicsPort`] seam; [`point_mass::PointMassWorld`] is a small
//! backend for headless runs and tests.
pub mod acquisition;
pub mod config;
pub mod events;
pub mod inventory;
pub mod overlap;
pub mod physics;
pub mod point_mass;
pub mod resources;
pub mod session;
pub mod vacuum;
