//! # Prompt Template Modules
//!
//! This module organizes all prompt templates used throughout the `vizon` library.

pub mod tasks;
