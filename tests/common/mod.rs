#![allow(dead_code)]

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use news_api::db::Pool;
use rocket::http::Status;
use rocket::local::blocking::{Client, LocalResponse};
use rocket::serde::json::Value;
use std::env;

const DOWN: &str = include_str!("../../migrations/2024-01-01-000000_create_news/down.sql");
const UP: &str = include_str!("../../migrations/2024-01-01-000000_create_news/up.sql");
const SEED: &str = include_str!("../fixtures/seed.sql");

/// A client whose pool never connects. Good for every request that must be
/// turned away before the store is consulted.
pub fn offline_client() -> Client {
    let manager = ConnectionManager::<PgConnection>::new("postgres://localhost:1/unreachable");
    let pool = Pool::builder()
        .max_size(1)
        .min_idle(Some(0))
        .build_unchecked(manager);
    Client::tracked(news_api::rocket_with_pool(pool)).expect("valid rocket instance")
}

/// A client backed by a freshly seeded database at `TEST_DATABASE_URL`.
pub fn seeded_client() -> Client {
    let url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = Pool::builder()
        .max_size(4)
        .build(ConnectionManager::<PgConnection>::new(url))
        .expect("test database pool");
    {
        let mut conn = pool.get().expect("test database connection");
        conn.batch_execute(DOWN).expect("drop tables");
        conn.batch_execute(UP).expect("create tables");
        conn.batch_execute(SEED).expect("seed tables");
    }
    Client::tracked(news_api::rocket_with_pool(pool)).expect("valid rocket instance")
}

pub fn json_body(response: LocalResponse) -> Value {
    response.into_json::<Value>().expect("json body")
}

pub fn assert_error(response: LocalResponse, status: Status, msg: &str) {
    assert_eq!(response.status(), status);
    let body = json_body(response);
    assert_eq!(body["error"]["msg"], msg, "{}", body);
}
