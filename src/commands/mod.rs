// Command handlers module
pub mod frame;
pub mod run;
pub mod select;
pub mod sensors;
pub mod version;

// Re-exports for cleaner imports
pub use version::execute as version;
