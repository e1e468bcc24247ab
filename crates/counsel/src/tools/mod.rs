//! The domain tools that models can use.

mod university;
mod web_search;

pub use university::UniversityLookupTool;
pub use web_search::WebSearchTool;
