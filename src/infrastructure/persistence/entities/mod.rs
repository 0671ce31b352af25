pub mod closed_channels;
pub mod open_channels;
pub mod shutdown_cells;
