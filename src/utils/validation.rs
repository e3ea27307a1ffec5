use chrono::{DateTime, Utc};
use validator::ValidationError;

pub fn in_the_future(value: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *value <= Utc::now() {
        let mut err = ValidationError::new("future");
        err.message = Some("must be in the future".into());
        return Err(err);
    }
    Ok(())
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

pub fn ordered_window(
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
) -> Result<(), ValidationError> {
    if end <= start {
        let mut err = ValidationError::new("time_window");
        err.message = Some("end_time must be after start_time".into());
        return Err(err);
    }
    Ok(())
}
