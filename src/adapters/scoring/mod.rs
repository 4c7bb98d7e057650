//! Evaluation scorer adapters.

mod http_scorer;
mod mock_scorer;

pub use http_scorer::{HttpScorer, HttpScorerConfig};
pub use mock_scorer::MockScorer;
