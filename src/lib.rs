//! ChromaPicker core: color notations, palettes, the settings store and the
//! palette history, independent of the UI toolkit.

pub mod app;
pub mod color;
mod document;
pub mod error;
pub mod history;
pub mod logging;
pub mod palette_item;
pub mod palette_page;
pub mod paths;
pub mod platform;
pub mod settings;

pub use app::AppContext;
pub use color::{ColorType, Rgb};
pub use error::{Error, Result};
pub use palette_page::PalettePage;
pub use settings::{Page, Settings, SettingsManager};
