// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod config;
pub mod menu;
pub mod records;
pub mod reports;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod test_utils;
