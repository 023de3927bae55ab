pub mod auth;
pub mod db;
pub mod mailer;
pub mod push;

pub use auth::PgAuthProvider;
pub use db::PgStore;
pub use mailer::{Mailer, SesMailer};
pub use push::FcmPush;
