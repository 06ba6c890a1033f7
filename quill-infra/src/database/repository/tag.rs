use quill_api::ContentResult;
use quill_domain::{PostStatus, Tag, TagName, TagSummary};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::HashMap;

use crate::database::entity::{post, post_tag, tag};
use crate::database::error::StorageResultExt;

pub struct TagRepository;

impl TagRepository {
    pub async fn find_by_slug<C: ConnectionTrait>(conn: &C, slug: &str) -> ContentResult<Option<Tag>> {
        let model = tag::Entity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(conn)
            .await
            .or_storage_failure()?;
        Ok(model.map(Tag::from))
    }

    /// 插入标签；name或slug冲突时返回 `Conflict`
    pub async fn insert<C: ConnectionTrait>(conn: &C, name: &TagName) -> ContentResult<Tag> {
        let model = tag::ActiveModel {
            name: Set(name.name.clone()),
            slug: Set(name.slug.clone()),
            ..Default::default()
        }
        .insert(conn)
        .await
        .or_conflict("Tag")?;
        Ok(Tag::from(model))
    }

    /// 用给定标签集合替换文章的全部标签关联
    pub async fn replace_for_post<C: ConnectionTrait>(
        conn: &C,
        post_id: i32,
        tag_ids: &[i32],
    ) -> ContentResult<()> {
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(conn)
            .await
            .or_storage_failure()?;

        if tag_ids.is_empty() {
            return Ok(());
        }
        let links = tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(*tag_id),
        });
        post_tag::Entity::insert_many(links)
            .exec_without_returning(conn)
            .await
            .or_storage_failure()?;
        Ok(())
    }

    /// 批量读取多篇文章的标签，按名称排序
    pub async fn tags_for_posts<C: ConnectionTrait>(
        conn: &C,
        post_ids: &[i32],
    ) -> ContentResult<HashMap<i32, Vec<Tag>>> {
        let mut tags: HashMap<i32, Vec<Tag>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(tags);
        }
        let rows = post_tag::Entity::find()
            .filter(post_tag::Column::PostId.is_in(post_ids.to_vec()))
            .find_also_related(tag::Entity)
            .order_by_asc(tag::Column::Name)
            .all(conn)
            .await
            .or_storage_failure()?;
        for (link, model) in rows {
            if let Some(model) = model {
                tags.entry(link.post_id).or_default().push(Tag::from(model));
            }
        }
        Ok(tags)
    }

    /// 全部标签及其已发布文章数
    pub async fn list_with_published_counts<C: ConnectionTrait>(
        conn: &C,
    ) -> ContentResult<Vec<TagSummary>> {
        let counts: HashMap<i32, i64> = post_tag::Entity::find()
            .select_only()
            .column(post_tag::Column::TagId)
            .column_as(Expr::col((post_tag::Entity, post_tag::Column::PostId)).count(), "post_count")
            .inner_join(post::Entity)
            .filter(post::Column::Status.eq(PostStatus::Published.as_str()))
            .group_by(post_tag::Column::TagId)
            .into_tuple::<(i32, i64)>()
            .all(conn)
            .await
            .or_storage_failure()?
            .into_iter()
            .collect();

        let tags = tag::Entity::find()
            .order_by_asc(tag::Column::Name)
            .all(conn)
            .await
            .or_storage_failure()?;

        Ok(tags
            .into_iter()
            .map(|model| {
                let post_count = counts.get(&model.id).copied().unwrap_or(0).max(0) as u64;
                TagSummary {
                    tag: Tag::from(model),
                    post_count,
                }
            })
            .collect())
    }
}
