pub mod feedback;
pub mod paper;
pub mod profile;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, ScoutError};

pub use feedback::FeedbackRepository;
pub use paper::PaperRepository;
pub use profile::ProfileRepository;

/// Exactly one row, the way a `.single()` call on the hosted SDK behaves
fn single<T: DeserializeOwned>(mut rows: Vec<Value>) -> Result<T> {
    match rows.len() {
        0 => Err(ScoutError::NotFound),
        1 => Ok(serde_json::from_value(rows.remove(0))?),
        n => Err(ScoutError::MultipleRows(n)),
    }
}

fn to_row<T: serde::Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
