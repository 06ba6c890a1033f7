use quill_api::{ContentError, ContentResult};
use quill_domain::{Post, PostStatus};
use sea_orm::entity::prelude::*;

/// Post 实体，对应数据库中的posts表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "String(Some(200))")]
    pub title: String,

    #[sea_orm(column_type = "String(Some(255))", unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,

    #[sea_orm(column_type = "String(Some(255))", nullable)]
    pub featured_image: Option<String>,

    #[sea_orm(column_type = "String(Some(20))")]
    pub status: String,

    pub author_id: i32,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub published_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTag,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::post_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostTag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Post {
    type Error = ContentError;

    fn try_from(model: Model) -> ContentResult<Self> {
        let status: PostStatus = model.status.parse().map_err(|_| {
            ContentError::storage(format!(
                "post {} has unknown status '{}'",
                model.id, model.status
            ))
        })?;
        Ok(Post {
            id: model.id,
            title: model.title,
            slug: model.slug,
            content: model.content,
            excerpt: model.excerpt,
            featured_image: model.featured_image,
            status,
            author_id: model.author_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            published_at: model.published_at,
        })
    }
}
