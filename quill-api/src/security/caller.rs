use serde::{Deserialize, Serialize};

/// 已认证的调用方
///
/// 由路由层在完成令牌校验后构造；匿名（访客）调用方在接口上以 `None` 表示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: i32,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(user_id: i32) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: i32) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_constructors() {
        let user = Caller::user(7);
        assert_eq!(user.user_id, 7);
        assert!(!user.is_admin);

        let admin = Caller::admin(1);
        assert!(admin.is_admin);
    }
}
