use sqlx::SqliteConnection;

/// The narrow identity lookup: returns the user's id iff a user row with that id exists.
pub async fn user_exists(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<i64>, sqlx::Error> {
    let id: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(id.map(|(id,)| id))
}
