//! Birthcard Render Engine
//!
//! Composites a gendered template, a circular user photo, and two text
//! lines into a single announcement raster, and exports it either to a
//! local PNG or to remote storage attached to a source record.
//!
//! # Pipeline Architecture
//!
//! ```text
//! template.png ──┐
//!                ├── Canvas (template's natural size)
//! photo bytes ───┘         │
//!                          ├── Circular clip (cover-fit, zoom, pan)
//! layout ──────────────────┘         │
//!                                    ├── Cast line
//! caption ───────────────────────────┘         │
//!                                              ├── Date line
//! date + time ─────────────────────────────────┘         │
//!                                                        ▼
//!                                                  Encode (PNG)
//!                                                        │
//!                                  ┌─────────────────────┴──────┐
//!                                  ▼                            ▼
//!                           local file                uploadFile ─► updateCell
//! ```

pub mod assets;
pub mod compositor;
pub mod engine;
pub mod export;
pub mod photo;
pub mod raster;
pub mod text;

pub use assets::{decode_image, DecodedImage, DirTemplateSource, InMemoryTemplates, TemplateSource};
pub use compositor::{render, DrawnText, RenderInputs, RenderReport, TextPainters};
pub use engine::{CompositingEngine, EngineOptions};
pub use export::*;
pub use raster::Raster;
pub use text::{BitmapPainter, FontPainter, TextMetrics, TextPainter};
