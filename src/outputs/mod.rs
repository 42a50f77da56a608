//! Output generation: charts, CSV and JSON.
//!
//! # Submodules
//!
//! - [`charts`]: Renders per-author statistics to SVG charts
//! - [`colors`]: Assigns each author a stable display colour
//! - [`csv`]: Persists and reloads the scraped record table
//! - [`json`]: Writes per-author statistics as JSON
//!
//! # Output Structure
//!
//! ```text
//! data.csv                          # author,title,nw,noi
//! charts/
//! ├── average-words-per-user.svg
//! ├── total-images-per-user.svg
//! ├── average-words-vs-total-images.svg
//! ├── total-words-per-user.svg
//! └── average-images-per-user.svg
//! ```

pub mod charts;
pub mod colors;
pub mod csv;
pub mod json;
