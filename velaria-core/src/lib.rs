//! Window covering device control logic
//!
//! This crate turns the queued inputs of the device - button edges,
//! timer expiries, attribute-change notifications - into actuator
//! motion and attribute writes. It is hardware-free: timers, the event
//! queue, and attribute storage are all traits, so the whole control
//! path runs under host tests.
//!
//! The layering is strict: [`actuator::Actuator`] moves one axis,
//! [`cover::Cover`] pairs the two axes of one endpoint, and
//! [`controller::Controller`] owns the covers, the chorded-button
//! automaton, and the event dispatch.

#![no_std]
#![deny(unsafe_code)]

pub mod actuator;
pub mod button;
pub mod config;
pub mod controller;
pub mod cover;
pub mod storage;
pub mod timer;

pub use actuator::Actuator;
pub use button::{Button, ButtonId};
pub use config::{AxisConfig, CoverConfig, ACTUATOR_TICK_MS, LONG_PRESS_TIMEOUT_MS, MAX_COVERS};
pub use controller::{ButtonMode, Controller, SideEffect, StateFlags};
pub use cover::Cover;
pub use storage::{KeyValueStore, RamKeyValueStore, StorageError};
pub use timer::{ManualTimer, Timer};
