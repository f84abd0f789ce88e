use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::select;
use rocket::serde::json::{json, Json, Value};
use serde::Serialize;

use crate::db::schema::topics;
use crate::db::Db;
use crate::types::{ApiError, ApiResult};

#[derive(Debug, Queryable, Serialize)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

impl Topic {
    pub fn load_all(connection: &mut PgConnection) -> Result<Vec<Topic>, ApiError> {
        topics::table
            .order(topics::slug.asc())
            .load::<Topic>(connection)
            .map_err(|e| e.into())
    }

    pub fn exists(slug: &str, connection: &mut PgConnection) -> Result<bool, ApiError> {
        select(exists(topics::table.filter(topics::slug.eq(slug))))
            .get_result::<bool>(connection)
            .map_err(|e| e.into())
    }
}

#[get("/topics")]
pub async fn list(db: Db) -> ApiResult<Value> {
    let topics = db.run(Topic::load_all).await?;
    Ok(Json(json!({ "topics": topics })))
}
