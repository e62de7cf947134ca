//! # gamekit-agent
//!
//! Client for the hosted GAME backend and the [`Agent`] that carries an
//! agent's goal, description, world info and functions to it.

pub mod agent;
pub mod client;

pub use agent::{Agent, AgentExport};
pub use client::{DeployArgs, GameClient, GameState, ReactArgs, SimulateArgs};
