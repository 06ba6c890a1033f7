use crate::error::{ContentError, ContentResult};
use crate::security::Caller;

/// 具有所有者的实体
///
/// 返回 `None` 表示没有任何非管理员调用方拥有它（例如访客评论）。
pub trait Owned {
    fn owner_id(&self) -> Option<i32>;
}

pub fn is_owner<E: Owned + ?Sized>(entity: &E, caller_id: i32) -> bool {
    entity.owner_id() == Some(caller_id)
}

pub fn is_admin(caller: &Caller) -> bool {
    caller.is_admin
}

pub fn require_admin(caller: &Caller) -> ContentResult<()> {
    if is_admin(caller) {
        Ok(())
    } else {
        Err(ContentError::forbidden("Admin access required"))
    }
}

/// 变更入口的统一守卫
///
/// 依次检查：目标存在（否则 `NotFound`），管理员或所有者（否则 `Forbidden`）。
/// 字段校验由调用方在守卫通过之后进行。
pub fn authorize_mutation<E: Owned>(
    entity: Option<E>,
    caller: &Caller,
    entity_name: &str,
) -> ContentResult<E> {
    let entity = entity.ok_or_else(|| ContentError::not_found(entity_name))?;
    if is_admin(caller) || is_owner(&entity, caller.user_id) {
        Ok(entity)
    } else {
        Err(ContentError::forbidden(format!(
            "{} is owned by another user",
            entity_name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug)]
    struct Doc(Option<i32>);

    impl Owned for Doc {
        fn owner_id(&self) -> Option<i32> {
            self.0
        }
    }

    #[test]
    fn test_is_owner() {
        assert!(is_owner(&Doc(Some(3)), 3));
        assert!(!is_owner(&Doc(Some(3)), 4));
        assert!(!is_owner(&Doc(None), 3));
    }

    #[test]
    fn test_authorize_mutation_order() {
        let missing = authorize_mutation::<Doc>(None, &Caller::admin(1), "Post");
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);

        let denied = authorize_mutation(Some(Doc(Some(2))), &Caller::user(5), "Post");
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Forbidden);

        assert!(authorize_mutation(Some(Doc(Some(5))), &Caller::user(5), "Post").is_ok());
        assert!(authorize_mutation(Some(Doc(Some(2))), &Caller::admin(9), "Post").is_ok());
    }

    #[test]
    fn test_guest_owned_only_by_admin() {
        let denied = authorize_mutation(Some(Doc(None)), &Caller::user(5), "Comment");
        assert_eq!(denied.unwrap_err().kind(), ErrorKind::Forbidden);
        assert!(authorize_mutation(Some(Doc(None)), &Caller::admin(1), "Comment").is_ok());
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&Caller::admin(1)).is_ok());
        assert_eq!(
            require_admin(&Caller::user(1)).unwrap_err().kind(),
            ErrorKind::Forbidden
        );
    }
}
