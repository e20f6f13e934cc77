use portal_models::User;
use sqlx::{postgres::PgRow, FromRow, Row};

pub(crate) struct UserRow(User);

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        r.0
    }
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> core::result::Result<Self, sqlx::Error> {
        Ok(Self(User {
            id: row.try_get::<i32, _>("id")? as u64,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            active: row.try_get("active")?,
        }))
    }
}
