//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use hive_core::domain::{Post, User};
use hive_core::error::RepoError;
use hive_core::ports::{PostQuery, PostRepository, SortMode, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

/// Escape LIKE wildcards in user-supplied search text.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Build the WHERE clause for a post listing.
fn filter_condition(query: &PostQuery) -> Condition {
    let mut cond = Condition::all();

    if let Some(cat) = &query.category {
        cond = cond.add(post::Column::Category.eq(cat));
    }
    if let Some(search) = &query.search {
        cond = cond.add(Expr::col(post::Column::Title).ilike(format!("%{}%", escape_like(search))));
    }
    if let Some(author_id) = query.author_id {
        cond = cond.add(post::Column::UserId.eq(author_id));
    }
    if query.featured_only {
        cond = cond.add(post::Column::IsFeatured.eq(true));
    }
    if let Some(cutoff) = query.sort.created_after(Utc::now()) {
        cond = cond.add(post::Column::CreatedAt.gte(cutoff));
    }

    cond
}

fn apply_order(
    select: sea_orm::Select<PostEntity>,
    sort: SortMode,
) -> sea_orm::Select<PostEntity> {
    match sort {
        SortMode::Newest => select.order_by(post::Column::CreatedAt, Order::Desc),
        SortMode::Oldest => select.order_by(post::Column::CreatedAt, Order::Asc),
        // Visit-count ordering with creation time as a stable tiebreaker.
        SortMode::Popular | SortMode::Trending => select
            .order_by(post::Column::Visit, Order::Desc)
            .order_by(post::Column::CreatedAt, Order::Desc),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let count = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }

    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let select = PostEntity::find().filter(filter_condition(query));
        let select = apply_order(select, query.sort)
            .offset(query.offset())
            .limit(query.limit);

        let result = select.all(&self.db).await.map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(filter_condition(query))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn increment_visit(&self, slug: &str) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Visit, Expr::col(post::Column::Visit).add(1))
            .filter(post::Column::Slug.eq(slug))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let result = PostEntity::delete_many()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }
}
