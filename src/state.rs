use crate::db::{DbPool, OrmConn};
use crate::email::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub mailer: Mailer,
}
