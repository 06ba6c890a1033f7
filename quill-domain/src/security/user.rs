use chrono::{DateTime, Utc};
use quill_api::{ContentError, ContentResult};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// User实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

const MAX_USERNAME_LENGTH: usize = 80;

/// 注册输入
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(
        email(message = "Valid email is required"),
        length(max = 120, message = "Email must be at most 120 characters")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl NewUser {
    /// 规范化邮箱与用户名后校验，按 email、username、password 的顺序返回第一条错误
    pub fn normalized(mut self) -> ContentResult<Self> {
        self.email = self.email.trim().to_lowercase();
        self.username = self.username.trim().to_string();
        self.validate().map_err(|errors| first_message(&errors))?;
        if self.username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(ContentError::invalid(format!(
                "Username must be at most {} characters",
                MAX_USERNAME_LENGTH
            )));
        }
        Ok(self)
    }
}

fn first_message(errors: &ValidationErrors) -> ContentError {
    let fields = errors.field_errors();
    ["email", "username", "password"]
        .iter()
        .filter_map(|field| fields.get(*field))
        .filter_map(|list| list.first())
        .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .map(ContentError::invalid)
        .unwrap_or_else(|| ContentError::invalid(errors.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(email: &str, username: &str, password: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_normalized() {
        let user = input(" Bob@Example.com ", "  bob ", "secret1").normalized().unwrap();
        assert_eq!(user.email, "bob@example.com");
        assert_eq!(user.username, "bob");
    }

    #[test]
    fn test_first_error_wins() {
        let err = input("nope", "", "123").normalized().unwrap_err();
        assert_eq!(err.to_string(), "Valid email is required");

        let err = input("a@b.com", "   ", "123").normalized().unwrap_err();
        assert_eq!(err.to_string(), "Username is required");

        let err = input("a@b.com", "ann", "123").normalized().unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters");
    }

    #[test]
    fn test_length_limits() {
        let long_email = format!("{}@{}.com", "a".repeat(60), "b".repeat(60));
        let err = input(&long_email, "ann", "secret1").normalized().unwrap_err();
        assert_eq!(err.to_string(), "Email must be at most 120 characters");

        let err = input("a@b.com", &"n".repeat(81), "secret1").normalized().unwrap_err();
        assert_eq!(err.to_string(), "Username must be at most 80 characters");

        assert!(input("a@b.com", &"n".repeat(80), "secret1").normalized().is_ok());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            email: "a@b.com".to_string(),
            username: "ann".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            is_admin: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "ann");
    }
}
