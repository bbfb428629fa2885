//! Test suite for the cadence Discord bot
//! This module contains the shared fixtures and the end-to-end command scenarios

pub mod common;
pub mod integration;
