//! Payroll calculation and approval engine.
//!
//! This crate computes monthly salary records from a grade's base salary,
//! configurable bonus and deduction rules, attendance facts and approved
//! salary advances, and moves those records through a review workflow
//! (pending, approved, paid or rejected) with audited manual adjustments.
//! A seniority batch job promotes employees along the grade ladder.
//!
//! The [`engine::PayrollEngine`] holds all state in memory and is exposed over
//! HTTP by [`api::create_router`].

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
