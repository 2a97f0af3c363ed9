pub mod commands;
pub mod doctor;
pub mod error;
pub mod manager;
pub mod paths;
pub mod pip_config;
pub mod registry;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
