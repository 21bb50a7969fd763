//! Birthcard Composition Model
//!
//! Defines the data contracts behind an announcement image:
//! - **Layout:** Position, size, and color of the photo and text layers
//! - **State:** The full set of parameters that determines a render
//! - **Dates:** Formatting of the raw date/time inputs into the date line
//! - **Records:** The patient record a composition is seeded from
//!
//! Layer positions are percentages (`0..=100`) of the canvas dimensions so
//! a layout survives templates of different sizes.

pub mod color;
pub mod datetime;
pub mod gender;
pub mod layer;
pub mod record;
pub mod state;

pub use color::*;
pub use datetime::*;
pub use gender::*;
pub use layer::*;
pub use record::*;
pub use state::*;
