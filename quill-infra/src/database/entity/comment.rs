use quill_api::{ContentError, ContentResult};
use quill_domain::{Comment, CommentAuthor, CommentStatus};
use sea_orm::entity::prelude::*;

/// Comment 实体，对应数据库中的comments表
///
/// `author_id` 为空表示访客评论，此时 `guest_name`/`guest_email` 必填；反之二者为空。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub post_id: i32,

    #[sea_orm(nullable)]
    pub author_id: Option<i32>,

    #[sea_orm(column_type = "String(Some(100))", nullable)]
    pub guest_name: Option<String>,

    #[sea_orm(column_type = "String(Some(120))", nullable)]
    pub guest_email: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(column_type = "String(Some(20))")]
    pub status: String,

    pub created_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub moderated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Comment {
    type Error = ContentError;

    fn try_from(model: Model) -> ContentResult<Self> {
        let status: CommentStatus = model.status.parse().map_err(|_| {
            ContentError::storage(format!(
                "comment {} has unknown status '{}'",
                model.id, model.status
            ))
        })?;
        let author = match (model.author_id, model.guest_name, model.guest_email) {
            (Some(user_id), _, _) => CommentAuthor::User { user_id },
            (None, Some(name), Some(email)) => CommentAuthor::Guest { name, email },
            (None, _, _) => {
                return Err(ContentError::storage(format!(
                    "comment {} has neither an author nor guest identity",
                    model.id
                )))
            }
        };
        Ok(Comment {
            id: model.id,
            post_id: model.post_id,
            author,
            content: model.content,
            status,
            created_at: model.created_at,
            moderated_at: model.moderated_at,
        })
    }
}
