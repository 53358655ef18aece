//! Shared utilities: subnet placement arithmetic.

pub mod ip_utils;
