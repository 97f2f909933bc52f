//! Stage core: configuration, row layout, file lifecycle, assembly, and the
//! error-isolating stage loop.

pub mod assemble;
pub mod config;
pub mod cursor;
pub mod layout;
pub mod stage;
