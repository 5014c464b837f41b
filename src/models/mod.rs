pub mod feedback;
pub mod paper;
pub mod profile;

pub use feedback::Feedback;
pub use paper::Paper;
pub use profile::{ExpertiseLevel, NewProfile, Profile, ProfileUpdate};
