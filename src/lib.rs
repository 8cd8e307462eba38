pub mod audio;
pub mod cli;
pub mod control;
pub mod graphics;
pub mod params;
pub mod render;
pub mod ui;
