// UI and formatting module

pub mod formatters;
pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_temperature, print_report, print_sensor_tree};
pub use prompts::{confirm, dimmed, select_channel, success, warn, SelectedChannel};
