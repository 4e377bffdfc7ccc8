//! Small formatting helpers

pub mod helper;
