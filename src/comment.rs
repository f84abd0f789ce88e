use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::{delete as diesel_delete, insert_into};
use rocket::futures::future::try_join;
use rocket::http::Status;
use rocket::response::status::NoContent;
use rocket::serde::json::{Json, Value};
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::article::Article;
use crate::db::schema::comments;
use crate::db::Db;
use crate::types::{ApiError, ApiResult, Resource, Validate};
use crate::utils::{path_id, serialize_date};

#[derive(Debug, Queryable, Serialize)]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    article_id: i32,
    author: String,
    body: String,
}

/// `POST` body. Only a JSON object is accepted; fields are checked in
/// `validate`.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct CommentBody {
    fields: Map<String, Value>,
}

impl CommentBody {
    fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(Value::as_str).map(String::from)
    }
}

/// A comment body that passed validation but isn't attached to an article yet.
#[derive(Debug, PartialEq, Eq)]
pub struct CommentDraft {
    author: String,
    body: String,
}

impl CommentDraft {
    pub fn on(self, article_id: i32) -> NewComment {
        NewComment {
            article_id,
            author: self.author,
            body: self.body,
        }
    }
}

impl Validate for CommentBody {
    type Valid = CommentDraft;

    fn validate(self) -> Result<CommentDraft, ApiError> {
        match (self.text("username"), self.text("body")) {
            (Some(author), Some(body)) if !body.trim().is_empty() => Ok(CommentDraft { author, body }),
            _ => Err(ApiError::malformed()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentContainer<T> {
    comment: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentsContainer<T> {
    comments: T,
}

impl Comment {
    pub fn load_for_article(
        article_id: i32,
        connection: &mut PgConnection,
    ) -> Result<Vec<Comment>, ApiError> {
        comments::table
            .filter(comments::article_id.eq(article_id))
            .order((comments::created_at.desc(), comments::comment_id.desc()))
            .load::<Comment>(connection)
            .map_err(|e| e.into())
    }

    /// Missing articles or users surface as foreign key violations.
    pub fn insert(new_comment: NewComment, connection: &mut PgConnection) -> Result<Comment, ApiError> {
        insert_into(comments::table)
            .values(&new_comment)
            .get_result::<Comment>(connection)
            .map_err(|e| e.into())
    }

    pub fn delete(id: i32, connection: &mut PgConnection) -> Result<(), ApiError> {
        let deleted = diesel_delete(comments::table.find(id)).execute(connection)?;
        match deleted {
            0 => Err(ApiError::not_found(Resource::Comment)),
            _ => Ok(()),
        }
    }
}

/// Comments of an existing article, newest first.
///
/// An empty result can't tell a missing article from one without comments,
/// so the existence probe runs alongside the fetch and decides afterwards.
pub async fn for_article(db: &Db, article_id: i32) -> Result<Vec<Comment>, ApiError> {
    let (exists, comments) = try_join(
        db.run(move |conn| Article::exists(article_id, conn)),
        db.run(move |conn| Comment::load_for_article(article_id, conn)),
    )
    .await?;
    if !exists {
        return Err(ApiError::not_found(Resource::Article));
    }
    Ok(comments)
}

#[get("/articles/<article_id>/comments")]
pub async fn get(
    db: Db,
    article_id: Result<i32, &str>,
) -> ApiResult<CommentsContainer<Vec<Comment>>> {
    let id = path_id(article_id)?;
    let comments = for_article(&db, id).await?;
    Ok(Json(CommentsContainer { comments }))
}

#[post("/articles/<article_id>/comments", data = "<details>")]
pub async fn add(
    db: Db,
    article_id: Result<i32, &str>,
    details: Option<Json<CommentBody>>,
) -> Result<(Status, Json<CommentContainer<Comment>>), ApiError> {
    let id = path_id(article_id)?;
    let draft = details.ok_or_else(ApiError::malformed)?.into_inner().validate()?;
    let new_comment = draft.on(id);
    let comment = db.run(move |conn| Comment::insert(new_comment, conn)).await?;
    Ok((Status::Created, Json(CommentContainer { comment })))
}

#[delete("/comments/<comment_id>")]
pub async fn delete(db: Db, comment_id: Result<i32, &str>) -> Result<NoContent, ApiError> {
    let id = path_id(comment_id)?;
    db.run(move |conn| Comment::delete(id, conn)).await?;
    Ok(NoContent)
}
