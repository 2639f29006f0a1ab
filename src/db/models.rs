use sqlx::FromRow;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};

use crate::db::schema;

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A row holding one or more secret columns that the migrator rewrites.
pub trait SecretRecord: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const TABLE: &'static str;
    const SELECT: &'static str;
    const UPDATE: &'static str;

    fn id(&self) -> &str;

    /// Non-NULL secret columns on this row, by column name. NULL columns are
    /// left out so they are never encrypted or counted.
    fn secret_fields_mut(&mut self) -> Vec<(&'static str, &mut String)>;

    /// Bind the update parameters in the order `UPDATE` expects.
    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

/// OAuth application with its consumer secret.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ApplicationCredential {
    #[sqlx(rename = "CONSUMER_KEY")]
    pub id: String,
    #[sqlx(rename = "CONSUMER_SECRET")]
    pub secret: Option<String>,
}

/// Issued access token with its refresh token. Either column may be NULL.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TokenPair {
    #[sqlx(rename = "TOKEN_ID")]
    pub id: String,
    #[sqlx(rename = "ACCESS_TOKEN")]
    pub access_token: Option<String>,
    #[sqlx(rename = "REFRESH_TOKEN")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AuthorizationCode {
    #[sqlx(rename = "CODE_ID")]
    pub id: String,
    #[sqlx(rename = "AUTHORIZATION_CODE")]
    pub code: Option<String>,
}

impl SecretRecord for ApplicationCredential {
    const TABLE: &'static str = schema::CONSUMER_APPS_TABLE;
    const SELECT: &'static str = schema::SELECT_CONSUMER_APPS;
    const UPDATE: &'static str = schema::UPDATE_CONSUMER_APPS;

    fn id(&self) -> &str {
        &self.id
    }

    fn secret_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        present("CONSUMER_SECRET", &mut self.secret).into_iter().collect()
    }

    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(self.secret.as_deref()).bind(self.id.as_str())
    }
}

impl SecretRecord for TokenPair {
    const TABLE: &'static str = schema::ACCESS_TOKEN_TABLE;
    const SELECT: &'static str = schema::SELECT_ACCESS_TOKENS;
    const UPDATE: &'static str = schema::UPDATE_ACCESS_TOKENS;

    fn id(&self) -> &str {
        &self.id
    }

    fn secret_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        present("ACCESS_TOKEN", &mut self.access_token)
            .into_iter()
            .chain(present("REFRESH_TOKEN", &mut self.refresh_token))
            .collect()
    }

    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.access_token.as_deref())
            .bind(self.refresh_token.as_deref())
            .bind(self.id.as_str())
    }
}

impl SecretRecord for AuthorizationCode {
    const TABLE: &'static str = schema::AUTHORIZATION_CODE_TABLE;
    const SELECT: &'static str = schema::SELECT_AUTHORIZATION_CODES;
    const UPDATE: &'static str = schema::UPDATE_AUTHORIZATION_CODES;

    fn id(&self) -> &str {
        &self.id
    }

    fn secret_fields_mut(&mut self) -> Vec<(&'static str, &mut String)> {
        present("AUTHORIZATION_CODE", &mut self.code).into_iter().collect()
    }

    fn bind_update<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(self.code.as_deref()).bind(self.id.as_str())
    }
}

fn present<'a>(
    column: &'static str,
    value: &'a mut Option<String>,
) -> Option<(&'static str, &'a mut String)> {
    value.as_mut().map(|v| (column, v))
}
