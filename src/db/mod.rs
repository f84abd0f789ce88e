use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use dotenv::dotenv;
use error_chain::ChainedError;
use log::{error, info};
use rocket::fairing::{AdHoc, Fairing};
use rocket::http::Status;
use rocket::request::{self, FromRequest};
use rocket::tokio::task;
use rocket::{outcome::Outcome, Request};
use std::env;

use crate::types::ApiError;

pub mod schema;

const DEFAULT_POOL_SIZE: u32 = 10;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

error_chain! {
    foreign_links {
        Var(::std::env::VarError);
        ParseInt(::std::num::ParseIntError);
        R2D2(r2d2::Error);
    }
}

/// Handle on the managed pool. Every store call made through it runs on the
/// blocking thread pool with its own pooled connection, so two calls awaited
/// together really do execute concurrently.
pub struct Db(Pool);

impl Db {
    pub async fn run<F, T>(&self, f: F) -> ::std::result::Result<T, ApiError>
    where
        F: FnOnce(&mut PgConnection) -> ::std::result::Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.0.clone();
        task::spawn_blocking(move || {
            let mut connection = pool.get()?;
            f(&mut *connection)
        })
        .await?
    }
}

/// Hands out the managed pool. If no pool is currently managed, fails with an
/// `InternalServerError` status. Connections are checked out lazily by
/// `Db::run`, so requests rejected during validation never touch the store.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Db {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Db, ()> {
        match request.rocket().state::<Pool>() {
            Some(pool) => Outcome::Success(Db(pool.clone())),
            None => Outcome::Error((Status::InternalServerError, ())),
        }
    }
}

fn pool_size() -> Result<u32> {
    match env::var("DATABASE_POOL_SIZE") {
        Ok(size) => Ok(size.trim().parse::<u32>()?),
        Err(env::VarError::NotPresent) => Ok(DEFAULT_POOL_SIZE),
        Err(e) => Err(e.into()),
    }
}

pub fn init_pool() -> Result<Pool> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL").chain_err(|| "DATABASE_URL must be set")?;
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder().max_size(pool_size()?).build(manager)?;
    Ok(pool)
}

/// Creates the pool while the application ignites and puts it under
/// management. Ignition is aborted if the pool can't be built.
pub fn stage() -> impl Fairing {
    AdHoc::try_on_ignite("Database pool", |rocket| async move {
        match task::spawn_blocking(init_pool).await {
            Ok(Ok(pool)) => {
                info!("database pool ready ({} connections max)", pool.max_size());
                Ok(rocket.manage(pool))
            }
            Ok(Err(e)) => {
                error!("failed to create database pool: {}", e.display_chain());
                Err(rocket)
            }
            Err(e) => {
                error!("database pool initialisation panicked: {}", e);
                Err(rocket)
            }
        }
    })
}
