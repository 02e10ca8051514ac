pub mod menu;
pub mod progress_bar;
pub mod puzzle_view;
pub mod summary;
