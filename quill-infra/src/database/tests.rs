use chrono::{Duration, Utc};
use quill_api::{ErrorKind, PageRequest};
use quill_domain::{CommentDraft, CommentStatus, GuestComment, PostStatus, TagName};
use sea_orm::DatabaseConnection;

use super::{
    CommentQuery, CommentRepository, DatabaseManager, DatabaseOptions, PostQuery, PostRepository,
    TagRepository, UnitOfWork, UserRepository,
};
use crate::database::repository::{PostRow, UserRow};

pub(crate) async fn memory_db() -> DatabaseConnection {
    let manager = DatabaseManager::connect(&DatabaseOptions::in_memory())
        .await
        .unwrap();
    manager.primary_db().as_ref().clone()
}

async fn seed_user(db: &DatabaseConnection, name: &str) -> i32 {
    UserRepository::insert(
        db,
        UserRow {
            email: format!("{}@example.com", name),
            username: name.to_string(),
            password_hash: "hash".to_string(),
            is_admin: false,
            created_at: Utc::now(),
        },
    )
    .await
    .unwrap()
    .id
}

fn row(author_id: i32, slug: &str, status: PostStatus) -> PostRow {
    let now = Utc::now();
    PostRow {
        title: slug.to_string(),
        slug: slug.to_string(),
        content: "content".to_string(),
        excerpt: None,
        featured_image: None,
        status,
        author_id,
        created_at: now,
        published_at: status.initial_published_at(now),
    }
}

#[tokio::test]
async fn test_duplicate_slug_is_conflict() {
    let db = memory_db().await;
    let author = seed_user(&db, "ann").await;

    PostRepository::insert(&db, row(author, "hello", PostStatus::Draft))
        .await
        .unwrap();
    let err = PostRepository::insert(&db, row(author, "hello", PostStatus::Draft))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert!(PostRepository::slug_taken(&db, "hello", None).await.unwrap());
    let own = PostRepository::find_by_slug(&db, "hello", false).await.unwrap().unwrap();
    assert!(!PostRepository::slug_taken(&db, "hello", Some(own.id)).await.unwrap());
}

#[tokio::test]
async fn test_savepoint_rollback_keeps_outer_writes() {
    let db = memory_db().await;
    let author = seed_user(&db, "ann").await;
    PostRepository::insert(&db, row(author, "taken", PostStatus::Draft))
        .await
        .unwrap();

    let uow = UnitOfWork::begin(&db).await.unwrap();
    PostRepository::insert(uow.conn(), row(author, "first", PostStatus::Draft))
        .await
        .unwrap();
    let savepoint = uow.savepoint().await.unwrap();
    let err = PostRepository::insert(&savepoint, row(author, "taken", PostStatus::Draft))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    savepoint.rollback().await.unwrap();
    uow.commit().await.unwrap();

    assert!(PostRepository::find_by_slug(&db, "first", false).await.unwrap().is_some());
}

#[tokio::test]
async fn test_dropped_unit_of_work_rolls_back() {
    let db = memory_db().await;
    let author = seed_user(&db, "ann").await;
    {
        let uow = UnitOfWork::begin(&db).await.unwrap();
        PostRepository::insert(uow.conn(), row(author, "ghost", PostStatus::Draft))
            .await
            .unwrap();
        uow.rollback().await.unwrap();
    }
    assert!(PostRepository::find_by_slug(&db, "ghost", false).await.unwrap().is_none());
}

#[tokio::test]
async fn test_page_ordering_and_filters() {
    let db = memory_db().await;
    let ann = seed_user(&db, "ann").await;
    let bob = seed_user(&db, "bob").await;

    let base = Utc::now();
    for (i, author) in [ann, bob, ann].into_iter().enumerate() {
        let mut r = row(author, &format!("post-{}", i), PostStatus::Published);
        r.created_at = base + Duration::seconds(i as i64);
        r.published_at = Some(base + Duration::seconds(10 - i as i64));
        PostRepository::insert(&db, r).await.unwrap();
    }
    PostRepository::insert(&db, row(ann, "draft", PostStatus::Draft))
        .await
        .unwrap();

    let published = PostRepository::page(
        &db,
        &PostQuery {
            status: Some(PostStatus::Published),
            ..Default::default()
        },
        PageRequest::new(1, 10),
    )
    .await
    .unwrap();
    assert_eq!(published.total, 3);
    let slugs: Vec<_> = published.items.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["post-0", "post-1", "post-2"]);

    let by_ann = PostRepository::page(
        &db,
        &PostQuery {
            author_id: Some(ann),
            ..Default::default()
        },
        PageRequest::new(1, 10),
    )
    .await
    .unwrap();
    assert_eq!(by_ann.total, 3);

    let beyond = PostRepository::page(&db, &PostQuery::default(), PageRequest::new(100, 2))
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 4);
    assert_eq!(beyond.pages, 2);
}

#[tokio::test]
async fn test_tags_and_published_counts() {
    let db = memory_db().await;
    let ann = seed_user(&db, "ann").await;
    let live = PostRepository::insert(&db, row(ann, "live", PostStatus::Published))
        .await
        .unwrap();
    let draft = PostRepository::insert(&db, row(ann, "draft", PostStatus::Draft))
        .await
        .unwrap();

    let rust = TagRepository::insert(&db, &TagName::parse("Rust").unwrap())
        .await
        .unwrap();
    let web = TagRepository::insert(&db, &TagName::parse("Web").unwrap())
        .await
        .unwrap();
    let err = TagRepository::insert(&db, &TagName::parse("rust").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    TagRepository::replace_for_post(&db, live.id, &[web.id, rust.id])
        .await
        .unwrap();
    TagRepository::replace_for_post(&db, draft.id, &[rust.id])
        .await
        .unwrap();

    let tags = TagRepository::tags_for_posts(&db, &[live.id, draft.id])
        .await
        .unwrap();
    let names: Vec<_> = tags[&live.id].iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Rust", "Web"]);
    assert_eq!(tags[&draft.id].len(), 1);

    let summaries = TagRepository::list_with_published_counts(&db).await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert!(summaries.iter().all(|s| s.post_count == 1));

    let tagged = PostRepository::page(
        &db,
        &PostQuery {
            tag_id: Some(rust.id),
            ..Default::default()
        },
        PageRequest::new(1, 10),
    )
    .await
    .unwrap();
    assert_eq!(tagged.total, 2);

    TagRepository::replace_for_post(&db, live.id, &[]).await.unwrap();
    let remaining = TagRepository::tags_for_posts(&db, &[live.id]).await.unwrap();
    assert!(!remaining.contains_key(&live.id));
}

#[tokio::test]
async fn test_comment_counts_and_cascade() {
    let db = memory_db().await;
    let ann = seed_user(&db, "ann").await;
    let post = PostRepository::insert(&db, row(ann, "live", PostStatus::Published))
        .await
        .unwrap();
    let now = Utc::now();

    let guest = CommentDraft::guest(&GuestComment {
        guest_name: "Guest".to_string(),
        guest_email: "guest@example.com".to_string(),
        content: "Pending words".to_string(),
    })
    .unwrap();
    CommentRepository::insert(&db, post.id, guest, now).await.unwrap();
    CommentRepository::insert(&db, post.id, CommentDraft::authored(ann, "Approved words").unwrap(), now)
        .await
        .unwrap();

    let counts = CommentRepository::count_approved_for_posts(&db, &[post.id])
        .await
        .unwrap();
    assert_eq!(counts.get(&post.id), Some(&1));
    assert_eq!(
        CommentRepository::count_by_status(&db, CommentStatus::Pending)
            .await
            .unwrap(),
        1
    );

    let pending = CommentRepository::page(
        &db,
        &CommentQuery {
            status: Some(CommentStatus::Pending),
            ..Default::default()
        },
        PageRequest::new(1, 20),
    )
    .await
    .unwrap();
    assert_eq!(pending.total, 1);
    assert!(pending.items[0].author.is_guest());

    PostRepository::delete(&db, post.id).await.unwrap();
    let all = CommentRepository::page(&db, &CommentQuery::default(), PageRequest::new(1, 20))
        .await
        .unwrap();
    assert_eq!(all.total, 0);
}
