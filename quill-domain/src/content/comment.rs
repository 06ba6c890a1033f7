use chrono::{DateTime, Utc};
use quill_api::{ContentError, ContentResult, Owned};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::constant;

/// 评论审核状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "rejected" => Ok(CommentStatus::Rejected),
            other => Err(ContentError::invalid(format!("Invalid comment status: {}", other))),
        }
    }
}

/// 管理员审核动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl ModerationAction {
    pub fn target_status(&self) -> CommentStatus {
        match self {
            ModerationAction::Approve => CommentStatus::Approved,
            ModerationAction::Reject => CommentStatus::Rejected,
        }
    }
}

impl FromStr for ModerationAction {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ModerationAction::Approve),
            "reject" => Ok(ModerationAction::Reject),
            _ => Err(ContentError::invalid("Invalid action")),
        }
    }
}

/// 评论作者
///
/// 已认证用户的身份在读取时通过用户关联解析；访客只有提交时填写的名称与邮箱。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CommentAuthor {
    User { user_id: i32 },
    Guest { name: String, email: String },
}

impl CommentAuthor {
    pub fn user_id(&self) -> Option<i32> {
        match self {
            CommentAuthor::User { user_id } => Some(*user_id),
            CommentAuthor::Guest { .. } => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, CommentAuthor::Guest { .. })
    }

    /// 入口状态：访客进入待审核，可信身份自动通过
    pub fn initial_status(&self) -> CommentStatus {
        match self {
            CommentAuthor::Guest { .. } => CommentStatus::Pending,
            CommentAuthor::User { .. } => CommentStatus::Approved,
        }
    }
}

/// Comment实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub author: CommentAuthor,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub moderated_at: Option<DateTime<Utc>>,
}

impl Owned for Comment {
    fn owner_id(&self) -> Option<i32> {
        self.author.user_id()
    }
}

impl Comment {
    /// 审核（无终态锁定，重复审核直接覆盖状态与审核时间）
    pub fn moderate(&mut self, action: ModerationAction, now: DateTime<Utc>) {
        self.status = action.target_status();
        self.moderated_at = Some(now);
    }

    /// 修改内容，不影响审核状态
    pub fn edit_content(&mut self, content: &str) -> ContentResult<()> {
        self.content = validate_content(content)?;
        Ok(())
    }
}

/// 校验并规范化评论内容
pub fn validate_content(content: &str) -> ContentResult<String> {
    let trimmed = content.trim();
    if trimmed.chars().count() < constant::MIN_COMMENT_LENGTH {
        return Err(ContentError::invalid(format!(
            "Comment must be at least {} characters",
            constant::MIN_COMMENT_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// 访客提交的评论
#[derive(Debug, Clone, Deserialize)]
pub struct GuestComment {
    pub guest_name: String,
    pub guest_email: String,
    pub content: String,
}

/// 已校验、待持久化的评论
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub author: CommentAuthor,
    pub content: String,
    pub status: CommentStatus,
}

impl CommentDraft {
    pub fn guest(input: &GuestComment) -> ContentResult<Self> {
        let name = input.guest_name.trim();
        if name.chars().count() < constant::MIN_GUEST_NAME_LENGTH {
            return Err(ContentError::invalid(format!(
                "Name must be at least {} characters",
                constant::MIN_GUEST_NAME_LENGTH
            )));
        }
        if name.chars().count() > constant::MAX_GUEST_NAME_LENGTH {
            return Err(ContentError::invalid(format!(
                "Name must be at most {} characters",
                constant::MAX_GUEST_NAME_LENGTH
            )));
        }
        let email = input.guest_email.trim();
        if !email.contains('@') {
            return Err(ContentError::invalid("Valid email is required"));
        }
        if email.chars().count() > constant::MAX_GUEST_EMAIL_LENGTH {
            return Err(ContentError::invalid(format!(
                "Email must be at most {} characters",
                constant::MAX_GUEST_EMAIL_LENGTH
            )));
        }
        let content = validate_content(&input.content)?;
        let author = CommentAuthor::Guest {
            name: name.to_string(),
            email: email.to_lowercase(),
        };
        Ok(Self {
            status: author.initial_status(),
            author,
            content,
        })
    }

    pub fn authored(user_id: i32, content: &str) -> ContentResult<Self> {
        let content = validate_content(content)?;
        let author = CommentAuthor::User { user_id };
        Ok(Self {
            status: author.initial_status(),
            author,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quill_api::ErrorKind;

    fn guest_input(name: &str, email: &str, content: &str) -> GuestComment {
        GuestComment {
            guest_name: name.to_string(),
            guest_email: email.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_guest_draft_is_pending_and_normalized() {
        let draft = CommentDraft::guest(&guest_input("  Ann ", " Ann@Example.COM ", "  Nice post!  "))
            .unwrap();
        assert_eq!(draft.status, CommentStatus::Pending);
        assert_eq!(draft.content, "Nice post!");
        assert_eq!(
            draft.author,
            CommentAuthor::Guest {
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_guest_validation_messages() {
        let err = CommentDraft::guest(&guest_input(" A ", "a@b.c", "hello world")).unwrap_err();
        assert_eq!(err.to_string(), "Name must be at least 2 characters");

        let err = CommentDraft::guest(&guest_input("Ann", "not-an-email", "hello world")).unwrap_err();
        assert_eq!(err.to_string(), "Valid email is required");

        let err = CommentDraft::guest(&guest_input("Ann", "a@b.c", "  hey ")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn test_guest_length_limits() {
        let err = CommentDraft::guest(&guest_input(&"n".repeat(101), "a@b.c", "hello world"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Name must be at most 100 characters");

        let email = format!("{}@example.com", "e".repeat(110));
        let err = CommentDraft::guest(&guest_input("Ann", &email, "hello world")).unwrap_err();
        assert_eq!(err.to_string(), "Email must be at most 120 characters");
    }

    #[test]
    fn test_authored_draft_is_approved() {
        let draft = CommentDraft::authored(4, "Great read").unwrap();
        assert_eq!(draft.status, CommentStatus::Approved);
        assert_eq!(draft.author.user_id(), Some(4));
        assert!(CommentDraft::authored(4, "tiny").is_err());
    }

    #[test]
    fn test_moderation_action_parse() {
        assert_eq!("approve".parse::<ModerationAction>().unwrap(), ModerationAction::Approve);
        assert_eq!("reject".parse::<ModerationAction>().unwrap(), ModerationAction::Reject);
        let err = "delete".parse::<ModerationAction>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid action");
    }

    #[test]
    fn test_re_moderation_overwrites() {
        let t0 = Utc::now();
        let mut comment = Comment {
            id: 1,
            post_id: 1,
            author: CommentAuthor::Guest {
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
            },
            content: "Hello there".to_string(),
            status: CommentStatus::Pending,
            created_at: t0,
            moderated_at: None,
        };

        comment.moderate(ModerationAction::Approve, t0);
        assert_eq!(comment.status, CommentStatus::Approved);
        assert_eq!(comment.moderated_at, Some(t0));

        let t1 = t0 + Duration::seconds(5);
        comment.moderate(ModerationAction::Reject, t1);
        assert_eq!(comment.status, CommentStatus::Rejected);
        assert_eq!(comment.moderated_at, Some(t1));
    }

    #[test]
    fn test_edit_keeps_status() {
        let mut comment = Comment {
            id: 2,
            post_id: 1,
            author: CommentAuthor::User { user_id: 3 },
            content: "Original text".to_string(),
            status: CommentStatus::Rejected,
            created_at: Utc::now(),
            moderated_at: None,
        };
        comment.edit_content("  Edited text  ").unwrap();
        assert_eq!(comment.content, "Edited text");
        assert_eq!(comment.status, CommentStatus::Rejected);
        assert!(comment.edit_content("no").is_err());
        assert_eq!(comment.owner_id(), Some(3));
    }
}
