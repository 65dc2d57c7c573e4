//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use serde::Deserialize;
use validator::Validate;

use crate::shared::error::AppError;
use crate::shared::validation::parse_id;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create post request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(max = 2048, message = "Image reference must be at most 2048 characters"))]
    pub image: Option<String>,

    #[validate(length(max = 2200, message = "Caption must be at most 2200 characters"))]
    pub caption: Option<String>,
}

/// Feed query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PostQueryParams {
    pub limit: Option<i64>,
    /// Only posts older than this id
    pub before: Option<String>,
}

/// Comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 2200, message = "Comment must be 1-2200 characters"))]
    pub comment: String,
}

/// Snowflake id sent in a JSON body, either as a string or a number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Text(String),
    Number(i64),
}

impl IdValue {
    pub fn parse(&self, what: &str) -> Result<i64, AppError> {
        match self {
            IdValue::Text(raw) => parse_id(raw, what),
            IdValue::Number(id) if *id > 0 => Ok(*id),
            IdValue::Number(_) => Err(AppError::BadRequest(format!("Invalid {} ID", what))),
        }
    }
}

/// Create room request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub user1_id: IdValue,
    pub user2_id: IdValue,
}

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::validate_body;
    use test_case::test_case;

    #[test]
    fn test_room_request_accepts_strings_and_numbers() {
        let body: CreateRoomRequest =
            serde_json::from_str(r#"{"user1Id": "12", "user2Id": 34}"#).unwrap();
        assert_eq!(body.user1_id.parse("user").unwrap(), 12);
        assert_eq!(body.user2_id.parse("user").unwrap(), 34);
    }

    #[test_case(r#"{"user1Id": "x", "user2Id": 1}"# ; "non numeric")]
    #[test_case(r#"{"user1Id": -4, "user2Id": 1}"# ; "negative")]
    fn test_room_request_rejects_bad_ids(json: &str) {
        let body: CreateRoomRequest = serde_json::from_str(json).unwrap();
        assert!(body.user1_id.parse("user").is_err());
    }

    #[test]
    fn test_signup_validation() {
        let body = SignupRequest {
            name: "Ann".into(),
            email: "not-an-email".into(),
            username: "ann".into(),
            password: "long enough".into(),
        };
        assert!(validate_body(&body).is_err());

        let body = SignupRequest {
            email: "ann@example.com".into(),
            ..body
        };
        assert!(validate_body(&body).is_ok());
    }

    #[test]
    fn test_comment_length() {
        let too_long = CommentRequest {
            comment: "x".repeat(2201),
        };
        assert!(validate_body(&too_long).is_err());
        assert!(validate_body(&CommentRequest { comment: "ok".into() }).is_ok());
    }
}
