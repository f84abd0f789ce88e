use rocket::serde::json::{json, Json, Value};

use crate::db::Db;
use crate::types::ApiResult;

pub mod models;

#[get("/users")]
pub async fn list(db: Db) -> ApiResult<Value> {
    let users = db.run(models::User::load_all).await?;
    Ok(Json(json!({ "users": users })))
}
