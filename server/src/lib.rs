//! # Authoritative Shooter Server Library
//!
//! This library implements the authoritative server for a real-time
//! top-down multiplayer shooter. Clients send movement and join intent;
//! the server advances a shared physical simulation at a fixed tick rate,
//! resolves collisions, and sends each client its own view of the world.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! The server runs the only copy of the game state. Players, bullets and
//! the static obstacle layout live in [`game::GameWorld`], which advances
//! them with a wall-clock-derived delta each tick. Clients never simulate;
//! they render the snapshots they are sent.
//!
//! ### Collision Resolution
//! Each tick runs two collision passes in a fixed order: bullets against
//! players first, then surviving bullets against obstacles. The order is a
//! gameplay contract: a bullet that could hit both in the same tick is
//! credited to the player hit, never swallowed by the wall.
//!
//! ### State Broadcasting
//! Snapshots go out at half the simulation rate (physics at 60 Hz,
//! broadcast at ~30 Hz) to halve bandwidth without touching simulation
//! fidelity. Every snapshot is per-recipient: your own state, everyone
//! else's, live bullets, the obstacle layout, and the top-five leaderboard.
//!
//! ## Architecture Design
//!
//! ### Single Timeline
//! All world mutation (inbound join/input/disconnect handlers and the tick
//! body) runs on one `tokio::select!` loop in [`network::Server::run`].
//! There is no finer-grained locking and no concurrent tick execution;
//! the network receive/send/timeout tasks only ferry messages over
//! channels.
//!
//! ### Module Organization
//!
//! - [`obstacle`]: static oriented-rectangle geometry with precomputed
//!   per-edge slope/intercept equations and the swept bullet test.
//! - [`entity`]: the shared kinematic value type plus player and bullet
//!   state and their per-tick update rules.
//! - [`collision`]: the two pure collision passes.
//! - [`game`]: entity collections, spawn sampling, the tick pipeline and
//!   snapshot assembly.
//! - [`client_manager`]: connection roster, capacity and timeouts.
//! - [`network`]: UDP transport, packet dispatch, and the driving loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 60 Hz simulation, at most 16 players.
//!     let mut server = Server::new(
//!         "127.0.0.1:8080",
//!         Duration::from_millis(16),
//!         16,
//!     ).await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod collision;
pub mod entity;
pub mod game;
pub mod network;
pub mod obstacle;
