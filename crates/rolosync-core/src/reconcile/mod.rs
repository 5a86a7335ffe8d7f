pub mod diff;
pub mod matching;
pub mod plan;

pub use diff::{diff_pair, FieldDiff};
pub use matching::{match_records, MatchKey, MatchOutcome, MatchedPair};
pub use plan::{build_plan, ContactCreate, ContactUpdate, SkipReason, SkippedContact, SyncPlan};
