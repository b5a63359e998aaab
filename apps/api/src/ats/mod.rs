// ATS analysis: keyword extraction, matching, section detection, insights, scoring.
// Text comes from `extraction`; persistence and HTTP live in `store` / `handlers`.

pub mod handlers;
pub mod insights;
pub mod keywords;
pub mod matcher;
pub mod pipeline;
pub mod scoring;
pub mod sections;
pub mod store;
