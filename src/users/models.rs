use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema::users;
use crate::types::ApiError;

#[derive(Debug, Queryable, Serialize)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
}

impl User {
    pub fn load_all(connection: &mut PgConnection) -> Result<Vec<User>, ApiError> {
        users::table
            .order(users::username.asc())
            .load::<User>(connection)
            .map_err(|e| e.into())
    }
}
