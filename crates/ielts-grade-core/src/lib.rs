//! ielts-grade-core — Answer grading engine for IELTS-style questions.
//!
//! This crate defines the question model, the grading rules for every
//! question type, quiz-level scoring with band conversion, and the batch
//! engine and reports the CLI builds on.

pub mod adapter;
pub mod alternatives;
pub mod band;
pub mod choice;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod field;
pub mod grader;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod quiz;
pub mod report;
pub mod results;
pub mod statistics;
pub mod submission;
