//! Monte Carlo equity engine for Pot-Limit Omaha, including double-board
//! "bomb pot" scenarios with up to eight simultaneous players.
//!
//! The flow: a [`request::SimulationRequest`] is validated, the
//! [`planner`] sizes the trial budget and worker pool, and the
//! [`orchestrator`] fans chunks of sampled trials out across a rayon
//! pool, each chunk drawing board run-outs from the shared-deck
//! [`sampler`] and scoring hands through a per-worker
//! [`eval_cache::EvalCache`] over the 2-hole/3-board
//! [`hand_evaluator`]. Fully dealt boards skip sampling entirely.

pub mod cards;
pub mod chunk;
pub mod cli;
pub mod display;
pub mod error;
pub mod eval_cache;
pub mod hand_evaluator;
pub mod orchestrator;
pub mod planner;
pub mod request;
pub mod sampler;
