pub mod buckets;
pub mod display;
pub mod metadata;
pub mod periods;
pub mod record;
pub mod status;

pub use buckets::{BaseGroup, StatusBuckets, UnsponsoredGroup, bucketize};
pub use metadata::{DetailsPayload, TypeFlags};
pub use record::{DaoPeriodConfig, PeriodValue, ProposalRecord, ProposalType};
pub use status::{ProposalStatus, determine_status};
