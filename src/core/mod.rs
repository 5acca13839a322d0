// Core engine exports
pub mod aggregator;
pub mod education;
pub mod error;
pub mod experience;
pub mod matcher;
pub mod normalizer;
pub mod skills;

pub use aggregator::{aggregate, weighted_score, MatchContext};
pub use education::{score_education, DegreeLevel};
pub use error::{MatchError, RecordKind};
pub use experience::score_experience;
pub use matcher::Matcher;
pub use normalizer::{normalize, AliasTable, AliasTableError, KeyPhrase, NormalizedToken, Normalizer};
pub use skills::score_skills;
