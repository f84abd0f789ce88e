#[macro_use]
extern crate diesel;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate rocket;

pub mod article;
pub mod classify;
pub mod comment;
pub mod db;
pub mod topic;
pub mod types;
pub mod users;
pub mod utils;

use rocket::{Build, Rocket};

/// Mounts every route and catcher. The store is supplied by the caller,
/// either as the ignition fairing or as an already built pool.
fn routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount(
            "/api",
            routes![
                topic::list,
                users::list,
                article::list,
                article::get,
                article::update_votes,
                comment::get,
                comment::add,
                comment::delete,
            ],
        )
        .register(
            "/",
            catchers![classify::unmatched_route, classify::framework_failure],
        )
}

/// The application as configured from the environment.
pub fn rocket() -> Rocket<Build> {
    routes(rocket::build().attach(db::stage()))
}

/// The application running against `pool`.
pub fn rocket_with_pool(pool: db::Pool) -> Rocket<Build> {
    routes(rocket::build().manage(pool))
}
