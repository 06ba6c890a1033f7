use async_trait::async_trait;
use quill_api::{ContentError, ContentResult};
use quill_domain::content::tag::normalize_tag_names;
use quill_domain::{Tag, TagName};
use quill_infra::database::TagRepository;
use quill_infra::{StorageResultExt, UnitOfWork};
use sea_orm::DatabaseTransaction;

/// 标签的查找与插入
#[async_trait]
trait TagStore: Send + Sync {
    async fn find_by_slug(&self, conn: &DatabaseTransaction, slug: &str) -> ContentResult<Option<Tag>>;

    async fn insert(&self, conn: &DatabaseTransaction, name: &TagName) -> ContentResult<Tag>;
}

struct RepositoryTagStore;

#[async_trait]
impl TagStore for RepositoryTagStore {
    async fn find_by_slug(&self, conn: &DatabaseTransaction, slug: &str) -> ContentResult<Option<Tag>> {
        TagRepository::find_by_slug(conn, slug).await
    }

    async fn insert(&self, conn: &DatabaseTransaction, name: &TagName) -> ContentResult<Tag> {
        TagRepository::insert(conn, name).await
    }
}

/// 标签名 → 规范Tag实体（不存在则创建）
///
/// 新标签写入调用方的工作单元，随其一起提交或回滚。多个显示名映射到同一slug时
/// 统一解析为最先创建的那个标签，后来的显示名被丢弃。
pub struct TagResolver;

impl TagResolver {
    pub async fn resolve<S: AsRef<str>>(uow: &UnitOfWork, names: &[S]) -> ContentResult<Vec<Tag>> {
        Self::resolve_with(&RepositoryTagStore, uow, names).await
    }

    async fn resolve_with<T: TagStore, S: AsRef<str>>(
        store: &T,
        uow: &UnitOfWork,
        names: &[S],
    ) -> ContentResult<Vec<Tag>> {
        let mut tags = Vec::new();
        for name in normalize_tag_names(names) {
            if let Some(tag) = store.find_by_slug(uow.conn(), &name.slug).await? {
                tags.push(tag);
                continue;
            }

            let savepoint = uow.savepoint().await?;
            match store.insert(&savepoint, &name).await {
                Ok(tag) => {
                    savepoint.commit().await.or_storage_failure()?;
                    tracing::debug!(tag_id = tag.id, slug = %tag.slug, "Tag created");
                    tags.push(tag);
                }
                Err(ContentError::Conflict(_)) => {
                    // 并发创建：复用胜出者
                    savepoint.rollback().await.or_storage_failure()?;
                    tracing::warn!(slug = %name.slug, "Tag insert lost a uniqueness race, reusing existing tag");
                    let winner = store
                        .find_by_slug(uow.conn(), &name.slug)
                        .await?
                        .ok_or_else(|| {
                            ContentError::conflict(format!("Tag '{}' could not be resolved", name.name))
                        })?;
                    tags.push(winner);
                }
                Err(e) => {
                    savepoint.rollback().await.or_storage_failure()?;
                    return Err(e);
                }
            }
        }
        Ok(tags)
    }
}
