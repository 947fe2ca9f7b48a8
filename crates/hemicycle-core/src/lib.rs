pub mod deputy;
pub mod legislature;
pub mod record;
pub mod shape;
pub mod skip;
pub mod transcript;
pub mod vote;

pub use deputy::{Biography, DeputyTable, Unresolved};
pub use legislature::{LEGISLATURES, Legislature, VoteLayout};
pub use record::{DeputyRecord, OrganRef, VoteRecord};
pub use shape::Shape;
pub use skip::{BatchReport, Skip, SkipReason};
pub use transcript::Speech;
pub use vote::{GroupBallot, Position, Scrutin, Voter, normalize_vote};
