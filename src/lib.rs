pub mod config;
pub mod error;
pub mod events;
pub mod surface;
pub mod tasks {
    pub mod control;
    pub mod ui_thread;
}

pub use error::Error;
pub use surface::DisplayCanvas;
