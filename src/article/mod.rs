use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text, Timestamp};
use diesel::{select, sql_query};
use rocket::serde::json::{json, Json, Value};
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::db::schema::articles;
use crate::db::Db;
use crate::types::{ApiError, ApiResult, Resource, Validate};
use crate::utils::{path_id, serialize_date};

pub mod query;

use self::query::ListingParams;

pub(crate) const ARTICLE_COLUMNS: &str = "articles.article_id, articles.title, articles.topic, \
     articles.author, articles.body, articles.created_at, articles.votes, articles.article_img_url";

static SELECT_ARTICLE: &str = "SELECT articles.*,
       (SELECT COUNT(*) FROM comments WHERE comments.article_id = articles.article_id)::int AS comment_count
  FROM articles
 WHERE articles.article_id = $1";

static UPDATE_ARTICLE_VOTES: &str = "WITH updated AS (
       UPDATE articles SET votes = votes + $2 WHERE article_id = $1 RETURNING *
     )
SELECT updated.*,
       (SELECT COUNT(*) FROM comments WHERE comments.article_id = updated.article_id)::int AS comment_count
  FROM updated";

#[derive(Debug, QueryableByName, Serialize)]
pub struct Article {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Text)]
    pub body: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Text)]
    pub article_img_url: String,
    #[diesel(sql_type = Integer)]
    pub comment_count: i32,
}

impl Article {
    pub fn load(id: i32, connection: &mut PgConnection) -> Result<Article, ApiError> {
        sql_query(SELECT_ARTICLE)
            .bind::<Integer, _>(id)
            .get_result::<Article>(connection)
            .optional()?
            .ok_or_else(|| ApiError::not_found(Resource::Article))
    }

    /// Adds `delta` to the stored vote count in a single statement.
    pub fn add_votes(id: i32, delta: i32, connection: &mut PgConnection) -> Result<Article, ApiError> {
        sql_query(UPDATE_ARTICLE_VOTES)
            .bind::<Integer, _>(id)
            .bind::<Integer, _>(delta)
            .get_result::<Article>(connection)
            .optional()?
            .ok_or_else(|| ApiError::not_found(Resource::Article))
    }

    pub fn exists(id: i32, connection: &mut PgConnection) -> Result<bool, ApiError> {
        select(exists(articles::table.find(id)))
            .get_result::<bool>(connection)
            .map_err(|e| e.into())
    }
}

/// `PATCH` body. Only a JSON object is accepted; fields are checked in
/// `validate`.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct VoteUpdate {
    fields: Map<String, Value>,
}

impl Validate for VoteUpdate {
    type Valid = i32;

    fn validate(self) -> Result<i32, ApiError> {
        self.fields
            .get("inc_votes")
            .and_then(Value::as_i64)
            .and_then(|delta| i32::try_from(delta).ok())
            .ok_or_else(ApiError::malformed)
    }
}

#[get("/articles?<params..>")]
pub async fn list(db: Db, params: ListingParams) -> ApiResult<Value> {
    let query = params.validate()?;
    let articles = db.run(move |conn| query.load(conn)).await?;
    Ok(Json(json!({ "articles": articles })))
}

#[get("/articles/<article_id>")]
pub async fn get(db: Db, article_id: Result<i32, &str>) -> ApiResult<Value> {
    let id = path_id(article_id)?;
    let article = db.run(move |conn| Article::load(id, conn)).await?;
    Ok(Json(json!({ "article": article })))
}

#[patch("/articles/<article_id>", data = "<update>")]
pub async fn update_votes(
    db: Db,
    article_id: Result<i32, &str>,
    update: Option<Json<VoteUpdate>>,
) -> ApiResult<Value> {
    let id = path_id(article_id)?;
    let update = update.ok_or_else(ApiError::malformed)?.into_inner();
    let delta = update.validate()?;
    let article = db.run(move |conn| Article::add_votes(id, delta, conn)).await?;
    Ok(Json(json!({ "article": article })))
}
