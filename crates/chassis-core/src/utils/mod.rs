//! Shared filesystem helpers used by the config and module loaders.

pub mod fs;

#[cfg(test)]
mod tests;
