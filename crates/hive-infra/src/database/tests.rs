use crate::database::entity::{post, user};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};
use hive_core::domain::{Post, User};
use hive_core::ports::{BaseRepository, PostRepository, UserRepository};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

fn post_model(slug: &str) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id: uuid::Uuid::new_v4(),
        user_id: uuid::Uuid::new_v4(),
        title: "Test Post".to_owned(),
        slug: slug.to_owned(),
        description: None,
        content: "Content".to_owned(),
        category: Some("general".to_owned()),
        img: None,
        visit: 7,
        is_featured: false,
        approved: true,
        nectar_awarded: false,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let model = post_model("test-post");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    assert!(result.is_some());
    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.visit, 7);
}

#[tokio::test]
async fn test_find_post_by_slug() {
    let model = post_model("honey-season");

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result = repo.find_by_slug("honey-season").await.unwrap();
    assert_eq!(result.unwrap().slug, "honey-season");
}

#[tokio::test]
async fn test_find_user_by_external_id() {
    let now = chrono::Utc::now();
    let user_id = uuid::Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: user_id,
            external_id: "idp_123".to_owned(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            img: None,
            saved_posts: serde_json::json!(["p1", "p2"]),
            nectar: 15,
            last_nectar_award_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let result: Option<User> = repo.find_by_external_id("idp_123").await.unwrap();

    let user = result.unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.username, "ada");
    assert_eq!(user.saved_posts, vec!["p1".to_string(), "p2".to_string()]);
    assert_eq!(user.nectar, 15);
}

#[tokio::test]
async fn test_delete_owned_reports_missing_match() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let deleted = repo
        .delete_owned(uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert!(!deleted);
}
