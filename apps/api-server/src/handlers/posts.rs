//! Post lifecycle handlers: listing, creation, deletion, and the admin
//! feature / approve / nectar-award actions.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use hive_core::domain::{Post, User, nectar, slug};
use hive_core::error::RepoError;
use hive_core::ports::{BaseRepository, PostQuery, PostRepository, SortMode, UserRepository};
use hive_shared::dto::{
    AuthorResponse, CreatePostRequest, ListPostsQuery, MessageResponse, NectarAwardResponse,
    PostActionRequest, PostListResponse, PostResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Resolve the request identity to its linked user record.
pub(super) async fn resolve_user(state: &AppState, identity: &Identity) -> Result<User, AppError> {
    state
        .users
        .find_by_external_id(&identity.subject)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

fn parse_sort(sort: Option<&str>) -> SortMode {
    match sort {
        Some("oldest") => SortMode::Oldest,
        Some("popular") => SortMode::Popular,
        Some("trending") => SortMode::Trending,
        // "newest", absent, and unrecognized values all mean newest-first.
        _ => SortMode::Newest,
    }
}

fn post_response(post: Post, author: AuthorResponse) -> PostResponse {
    PostResponse {
        id: post.id,
        user: author,
        title: post.title,
        slug: post.slug,
        desc: post.description,
        content: post.content,
        category: post.category,
        img: post.img,
        visit: post.visit,
        is_featured: post.is_featured,
        approved: post.approved,
        nectar_awarded: post.nectar_awarded,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

async fn author_of(
    state: &AppState,
    user_id: Uuid,
    cache: &mut HashMap<Uuid, AuthorResponse>,
) -> Result<AuthorResponse, AppError> {
    if let Some(author) = cache.get(&user_id) {
        return Ok(author.clone());
    }

    let author = match state.users.find_by_id(user_id).await? {
        Some(user) => AuthorResponse {
            username: user.username,
            img: user.img,
        },
        None => {
            // Author rows cascade-delete their posts, so this only happens on
            // a read racing a user deletion.
            tracing::warn!(%user_id, "post author missing");
            AuthorResponse {
                username: "unknown".to_string(),
                img: None,
            }
        }
    };

    cache.insert(user_id, author.clone());
    Ok(author)
}

async fn single_response(state: &AppState, post: Post) -> Result<PostResponse, AppError> {
    let mut cache = HashMap::new();
    let author = author_of(state, post.user_id, &mut cache).await?;
    Ok(post_response(post, author))
}

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();

    let mut post_query = PostQuery {
        category: q.cat,
        search: q.search,
        author_id: None,
        featured_only: q.featured.unwrap_or(false),
        sort: parse_sort(q.sort.as_deref()),
        page: q.page.unwrap_or(1).max(1),
        limit: q.limit.unwrap_or(10).clamp(1, 100),
    };

    if let Some(author) = &q.author {
        let user = state
            .users
            .find_by_username(author)
            .await?
            .ok_or_else(|| AppError::NotFound("No posts found for this author".to_string()))?;
        post_query.author_id = Some(user.id);
    }

    let posts = state.posts.list(&post_query).await?;
    // The page boundary is checked against the filtered total, so the flag
    // stays correct for category / author / search listings.
    let total = state.posts.count(&post_query).await?;
    let has_more = post_query.page * post_query.limit < total;

    let mut cache = HashMap::new();
    let mut responses = Vec::with_capacity(posts.len());
    for post in posts {
        let author = author_of(&state, post.user_id, &mut cache).await?;
        responses.push(post_response(post, author));
    }

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: responses,
        has_more,
    }))
}

/// GET /api/posts/{slug}
///
/// Reading a post counts as a visit; the counter bump is a single atomic
/// column update.
pub async fn get_post(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    match state.posts.increment_visit(&slug).await {
        Ok(()) => {}
        Err(RepoError::NotFound) => {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let post = state
        .posts
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let response = single_response(&state, post).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = resolve_user(&state, &identity).await?;

    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    // Dedup by numeric suffix starting at 2. The slug column's unique index
    // backs this up: a concurrent insert of the same candidate fails with a
    // constraint violation instead of producing a duplicate.
    let base = slug::slugify(&title);
    let mut candidate = base.clone();
    let mut counter = 2u32;
    while state.posts.slug_exists(&candidate).await? {
        candidate = slug::with_suffix(&base, counter);
        counter += 1;
    }

    let post = Post::new(
        user.id,
        title,
        candidate,
        req.desc,
        req.content,
        req.category,
        req.img,
    );

    let created = state.posts.insert(post).await?;
    tracing::info!(slug = %created.slug, user = %user.username, "post created");

    let response = single_response(&state, created).await?;
    Ok(HttpResponse::Created().json(response))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if identity.role.is_admin() {
        return match state.posts.delete(id).await {
            Ok(()) => Ok(HttpResponse::Ok().json(MessageResponse::new("Post has been deleted"))),
            Err(RepoError::NotFound) => Err(AppError::NotFound("Post not found".to_string())),
            Err(e) => Err(e.into()),
        };
    }

    let user = resolve_user(&state, &identity).await?;

    if state.posts.delete_owned(id, user.id).await? {
        Ok(HttpResponse::Ok().json(MessageResponse::new("Post has been deleted")))
    } else {
        Err(AppError::Forbidden(
            "You can delete only your posts".to_string(),
        ))
    }
}

/// PATCH /api/posts/feature
pub async fn feature_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostActionRequest>,
) -> AppResult<HttpResponse> {
    identity.require_admin("You cannot feature posts")?;

    let mut post = state
        .posts
        .find_by_id(body.post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    post.is_featured = !post.is_featured;
    let post = state.posts.update(post).await?;

    let response = single_response(&state, post).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// PATCH /api/posts/approve
pub async fn approve_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostActionRequest>,
) -> AppResult<HttpResponse> {
    identity.require_admin("You cannot approve posts")?;

    let mut post = state
        .posts
        .find_by_id(body.post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if post.approved {
        return Err(AppError::Conflict("Post already approved".to_string()));
    }

    post.approved = true;
    let post = state.posts.update(post).await?;

    let response = single_response(&state, post).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// PATCH /api/posts/awardNectar
pub async fn award_nectar(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostActionRequest>,
) -> AppResult<HttpResponse> {
    identity.require_admin("Admin privileges required")?;

    let mut post = state
        .posts
        .find_by_id(body.post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    nectar::check_post_awardable(&post)?;

    let mut user = state
        .users
        .find_by_id(post.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let now = Utc::now();
    if let Some(wait_hours) = nectar::cooldown_remaining_hours(user.last_nectar_award_at, now) {
        return Err(AppError::RateLimited { wait_hours });
    }

    // Two separate writes with no surrounding transaction. The user credit
    // lands first: if the post-flag write fails, a retry trips the cooldown
    // rather than double-crediting the balance.
    user.nectar += nectar::AWARD_AMOUNT;
    user.last_nectar_award_at = Some(now);
    let user = state.users.update(user).await?;

    post.nectar_awarded = true;
    state.posts.update(post).await?;

    tracing::info!(user = %user.username, nectar = user.nectar, "nectar awarded");

    Ok(HttpResponse::Ok().json(NectarAwardResponse {
        message: "Nectar awarded successfully!".to_string(),
        nectar: user.nectar,
    }))
}

/// GET /api/posts/upload-auth
pub async fn upload_auth(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let params = state.uploads.authentication_parameters()?;
    Ok(HttpResponse::Ok().json(params))
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use serde_json::json;

    use hive_core::ports::{BaseRepository, Role};
    use hive_shared::dto::{PostListResponse, PostResponse};

    use crate::handlers::testing::{bearer, init_app, seed_post, seed_user, token_service};
    use crate::state::AppState;

    #[actix_web::test]
    async fn create_requires_authentication() {
        let state = AppState::for_tests();
        let app = init_app(state, token_service()).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({"title": "No Token", "content": "body"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn create_with_unlinked_subject_is_not_found() {
        let state = AppState::for_tests();
        let tokens = token_service();
        let app = init_app(state, tokens.clone()).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&tokens, "idp_ghost", Role::User))
            .set_json(json!({"title": "Ghost Post", "content": "body"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn same_title_posts_get_suffixed_slugs() {
        let state = AppState::for_tests();
        let tokens = token_service();
        seed_user(&state, "idp_ada", "ada").await;
        let app = init_app(state, tokens.clone()).await;

        let mut slugs = Vec::new();
        for _ in 0..3 {
            let req = test::TestRequest::post()
                .uri("/api/posts")
                .insert_header(bearer(&tokens, "idp_ada", Role::User))
                .set_json(json!({"title": "Hello World", "content": "body"}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 201);
            let post: PostResponse = test::read_body_json(resp).await;
            slugs.push(post.slug);
        }

        assert_eq!(slugs, vec!["hello-world", "hello-world-2", "hello-world-3"]);
    }

    #[actix_web::test]
    async fn delete_by_non_owner_is_forbidden() {
        let state = AppState::for_tests();
        let tokens = token_service();
        let owner = seed_user(&state, "idp_owner", "owner").await;
        seed_user(&state, "idp_other", "other").await;
        let post = seed_post(&state, &owner, "Owned Post", "owned-post").await;
        let app = init_app(state.clone(), tokens.clone()).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", post.id))
            .insert_header(bearer(&tokens, "idp_other", Role::User))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);

        // Still present.
        assert!(state.posts.find_by_id(post.id).await.unwrap().is_some());

        // The owner can delete it.
        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", post.id))
            .insert_header(bearer(&tokens, "idp_owner", Role::User))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert!(state.posts.find_by_id(post.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn admin_deletes_any_post() {
        let state = AppState::for_tests();
        let tokens = token_service();
        let owner = seed_user(&state, "idp_owner", "owner").await;
        let post = seed_post(&state, &owner, "Owned Post", "owned-post").await;
        let app = init_app(state.clone(), tokens.clone()).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", post.id))
            .insert_header(bearer(&tokens, "idp_admin", Role::Admin))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        assert!(state.posts.find_by_id(post.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn feature_requires_admin_and_toggles() {
        let state = AppState::for_tests();
        let tokens = token_service();
        let owner = seed_user(&state, "idp_owner", "owner").await;
        let post = seed_post(&state, &owner, "Some Post", "some-post").await;
        let app = init_app(state, tokens.clone()).await;

        let req = test::TestRequest::patch()
            .uri("/api/posts/feature")
            .insert_header(bearer(&tokens, "idp_owner", Role::User))
            .set_json(json!({"postId": post.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);

        let req = test::TestRequest::patch()
            .uri("/api/posts/feature")
            .insert_header(bearer(&tokens, "idp_admin", Role::Admin))
            .set_json(json!({"postId": post.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: PostResponse = test::read_body_json(resp).await;
        assert!(body.is_featured);

        // A second toggle unfeatures.
        let req = test::TestRequest::patch()
            .uri("/api/posts/feature")
            .insert_header(bearer(&tokens, "idp_admin", Role::Admin))
            .set_json(json!({"postId": post.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: PostResponse = test::read_body_json(resp).await;
        assert!(!body.is_featured);
    }

    #[actix_web::test]
    async fn approve_twice_conflicts() {
        let state = AppState::for_tests();
        let tokens = token_service();
        let owner = seed_user(&state, "idp_owner", "owner").await;
        let post = seed_post(&state, &owner, "Pending Post", "pending-post").await;
        let app = init_app(state, tokens.clone()).await;

        let req = test::TestRequest::patch()
            .uri("/api/posts/approve")
            .insert_header(bearer(&tokens, "idp_admin", Role::Admin))
            .set_json(json!({"postId": post.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: PostResponse = test::read_body_json(resp).await;
        assert!(body.approved);

        let req = test::TestRequest::patch()
            .uri("/api/posts/approve")
            .insert_header(bearer(&tokens, "idp_admin", Role::Admin))
            .set_json(json!({"postId": post.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
    }

    #[actix_web::test]
    async fn award_nectar_rules() {
        let state = AppState::for_tests();
        let tokens = token_service();
        let owner = seed_user(&state, "idp_owner", "owner").await;
        let first = seed_post(&state, &owner, "First Post", "first-post").await;
        let second = seed_post(&state, &owner, "Second Post", "second-post").await;
        let app = init_app(state.clone(), tokens.clone()).await;

        let admin = bearer(&tokens, "idp_admin", Role::Admin);

        // Unapproved post cannot be awarded.
        let req = test::TestRequest::patch()
            .uri("/api/posts/awardNectar")
            .insert_header(admin.clone())
            .set_json(json!({"postId": first.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);

        // Approve both posts.
        for id in [first.id, second.id] {
            let req = test::TestRequest::patch()
                .uri("/api/posts/approve")
                .insert_header(admin.clone())
                .set_json(json!({"postId": id}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 200);
        }

        // First award succeeds and credits 5 nectar.
        let req = test::TestRequest::patch()
            .uri("/api/posts/awardNectar")
            .insert_header(admin.clone())
            .set_json(json!({"postId": first.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["nectar"], 5);

        // Same post again: already awarded.
        let req = test::TestRequest::patch()
            .uri("/api/posts/awardNectar")
            .insert_header(admin.clone())
            .set_json(json!({"postId": first.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);

        // Different post, same author, inside the 24h window: rate limited.
        let req = test::TestRequest::patch()
            .uri("/api/posts/awardNectar")
            .insert_header(admin.clone())
            .set_json(json!({"postId": second.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 429);

        // Non-admins cannot award at all.
        let req = test::TestRequest::patch()
            .uri("/api/posts/awardNectar")
            .insert_header(bearer(&tokens, "idp_owner", Role::User))
            .set_json(json!({"postId": second.id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
    }

    #[actix_web::test]
    async fn has_more_reflects_the_filtered_count() {
        let state = AppState::for_tests();
        let tokens = token_service();
        let author = seed_user(&state, "idp_author", "author").await;

        for i in 0..3 {
            let mut post = seed_post(
                &state,
                &author,
                &format!("Tech {i}"),
                &format!("tech-{i}"),
            )
            .await;
            post.category = Some("tech".to_string());
            state.posts.update(post).await.unwrap();
        }
        for i in 0..5 {
            seed_post(&state, &author, &format!("Other {i}"), &format!("other-{i}")).await;
        }

        let app = init_app(state, tokens).await;

        let req = test::TestRequest::get()
            .uri("/api/posts?cat=tech&limit=2&page=1")
            .to_request();
        let body: PostListResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.posts.len(), 2);
        assert!(body.has_more);

        // Page 2 holds the last matching post. Eight posts exist in total;
        // only the three in the category count toward the flag.
        let req = test::TestRequest::get()
            .uri("/api/posts?cat=tech&limit=2&page=2")
            .to_request();
        let body: PostListResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.posts.len(), 1);
        assert!(!body.has_more);
    }

    #[actix_web::test]
    async fn unknown_author_listing_is_not_found() {
        let state = AppState::for_tests();
        let app = init_app(state, token_service()).await;

        let req = test::TestRequest::get()
            .uri("/api/posts?author=nobody")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn trending_is_recent_posts_by_visits() {
        let state = AppState::for_tests();
        let tokens = token_service();
        let author = seed_user(&state, "idp_author", "author").await;

        let mut old = hive_core::domain::Post::new(
            author.id,
            "Old Favorite".to_string(),
            "old-favorite".to_string(),
            None,
            "content".to_string(),
            None,
            None,
        );
        old.visit = 500;
        old.created_at = chrono::Utc::now() - chrono::Duration::days(30);
        state.posts.insert(old).await.unwrap();

        let mut quiet = seed_post(&state, &author, "Quiet New", "quiet-new").await;
        quiet.visit = 3;
        state.posts.update(quiet).await.unwrap();

        let mut hot = seed_post(&state, &author, "Hot New", "hot-new").await;
        hot.visit = 40;
        state.posts.update(hot).await.unwrap();

        let app = init_app(state, tokens).await;

        let req = test::TestRequest::get()
            .uri("/api/posts?sort=trending")
            .to_request();
        let body: PostListResponse = test::call_and_read_body_json(&app, req).await;

        let slugs: Vec<&str> = body.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["hot-new", "quiet-new"]);
    }

    #[actix_web::test]
    async fn reading_a_post_counts_a_visit() {
        let state = AppState::for_tests();
        let tokens = token_service();
        let author = seed_user(&state, "idp_author", "author").await;
        seed_post(&state, &author, "Visited Post", "visited-post").await;
        let app = init_app(state, tokens).await;

        let req = test::TestRequest::get()
            .uri("/api/posts/visited-post")
            .to_request();
        let body: PostResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.visit, 1);
        assert_eq!(body.user.username, "author");

        let req = test::TestRequest::get()
            .uri("/api/posts/visited-post")
            .to_request();
        let body: PostResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.visit, 2);
    }

    #[actix_web::test]
    async fn missing_slug_is_not_found() {
        let state = AppState::for_tests();
        let app = init_app(state, token_service()).await;

        let req = test::TestRequest::get()
            .uri("/api/posts/no-such-post")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn upload_auth_returns_signed_parameters() {
        let state = AppState::for_tests();
        let app = init_app(state, token_service()).await;

        let req = test::TestRequest::get()
            .uri("/api/posts/upload-auth")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert!(body["token"].is_string());
        assert!(body["expire"].as_i64().unwrap() > chrono::Utc::now().timestamp());
        assert_eq!(body["signature"].as_str().unwrap().len(), 40);
    }
}
