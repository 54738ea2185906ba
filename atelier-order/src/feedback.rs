use crate::models::{Complaint, ComplaintStatus};
use chrono::{DateTime, Utc};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Order already has a rating: {0}")]
    DuplicateRating(String),

    #[error("Rating score {0} outside {MIN_SCORE}..={MAX_SCORE}")]
    ScoreOutOfRange(i32),

    #[error("Complaint message must not be empty")]
    EmptyMessage,

    #[error("Complaint already closed: {0}")]
    AlreadyClosed(String),
}

pub fn validate_score(score: i32) -> Result<(), FeedbackError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(FeedbackError::ScoreOutOfRange(score));
    }
    Ok(())
}

pub fn validate_complaint_message(message: &str) -> Result<(), FeedbackError> {
    if message.trim().is_empty() {
        return Err(FeedbackError::EmptyMessage);
    }
    Ok(())
}

pub fn close_complaint(complaint: &mut Complaint, now: DateTime<Utc>) -> Result<(), FeedbackError> {
    if complaint.status == ComplaintStatus::Closed {
        return Err(FeedbackError::AlreadyClosed(complaint.id.to_string()));
    }
    complaint.status = ComplaintStatus::Closed;
    complaint.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn score_bounds() {
        assert!(validate_score(1).is_ok());
        assert!(validate_score(5).is_ok());
        assert!(matches!(validate_score(0), Err(FeedbackError::ScoreOutOfRange(0))));
        assert!(matches!(validate_score(6), Err(FeedbackError::ScoreOutOfRange(6))));
    }

    #[test]
    fn complaint_message_must_have_content() {
        assert!(validate_complaint_message("the header is broken").is_ok());
        assert!(validate_complaint_message("   ").is_err());
    }

    #[test]
    fn closing_twice_fails() {
        let mut complaint = Complaint::new(Uuid::new_v4(), Uuid::new_v4(), "late delivery".to_string());
        close_complaint(&mut complaint, Utc::now()).unwrap();
        assert_eq!(complaint.status, ComplaintStatus::Closed);
        assert!(matches!(
            close_complaint(&mut complaint, Utc::now()),
            Err(FeedbackError::AlreadyClosed(_))
        ));
    }
}
