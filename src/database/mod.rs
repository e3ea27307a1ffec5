pub mod interview_store;
pub mod pool;
pub mod profile_store;
pub mod shadowing_store;

pub use interview_store::{InterviewStore, PgInterviewStore};
pub use profile_store::{PgProfileStore, ProfileStore};
pub use shadowing_store::{PgShadowingRequestStore, ShadowingRequestStore};
