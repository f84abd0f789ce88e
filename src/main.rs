use rocket::{Build, Rocket};

#[rocket::launch]
fn launch() -> Rocket<Build> {
    news_api::rocket()
}
