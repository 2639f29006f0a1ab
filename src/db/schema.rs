//! Table names, migration queries, and DDL for the identity store tables.
//! Column names follow the upstream identity server schema.

pub const CONSUMER_APPS_TABLE: &str = "IDN_OAUTH_CONSUMER_APPS";
pub const ACCESS_TOKEN_TABLE: &str = "IDN_OAUTH2_ACCESS_TOKEN";
pub const AUTHORIZATION_CODE_TABLE: &str = "IDN_OAUTH2_AUTHORIZATION_CODE";

pub const SELECT_CONSUMER_APPS: &str =
    "SELECT CONSUMER_KEY, CONSUMER_SECRET FROM IDN_OAUTH_CONSUMER_APPS";
pub const UPDATE_CONSUMER_APPS: &str =
    "UPDATE IDN_OAUTH_CONSUMER_APPS SET CONSUMER_SECRET = ? WHERE CONSUMER_KEY = ?";

pub const SELECT_ACCESS_TOKENS: &str =
    "SELECT TOKEN_ID, ACCESS_TOKEN, REFRESH_TOKEN FROM IDN_OAUTH2_ACCESS_TOKEN";
pub const UPDATE_ACCESS_TOKENS: &str =
    "UPDATE IDN_OAUTH2_ACCESS_TOKEN SET ACCESS_TOKEN = ?, REFRESH_TOKEN = ? WHERE TOKEN_ID = ?";

pub const SELECT_AUTHORIZATION_CODES: &str =
    "SELECT CODE_ID, AUTHORIZATION_CODE FROM IDN_OAUTH2_AUTHORIZATION_CODE";
pub const UPDATE_AUTHORIZATION_CODES: &str =
    "UPDATE IDN_OAUTH2_AUTHORIZATION_CODE SET AUTHORIZATION_CODE = ? WHERE CODE_ID = ?";

/// SQLite DDL for the migrated tables, reduced to the columns the migration
/// touches. Secret columns are nullable as upstream. Used to bootstrap empty
/// databases; never alters existing tables.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS IDN_OAUTH_CONSUMER_APPS (
    CONSUMER_KEY TEXT NOT NULL PRIMARY KEY,
    CONSUMER_SECRET TEXT NULL
);

CREATE TABLE IF NOT EXISTS IDN_OAUTH2_ACCESS_TOKEN (
    TOKEN_ID TEXT NOT NULL PRIMARY KEY,
    ACCESS_TOKEN TEXT NULL,
    REFRESH_TOKEN TEXT NULL
);

CREATE TABLE IF NOT EXISTS IDN_OAUTH2_AUTHORIZATION_CODE (
    CODE_ID TEXT NOT NULL PRIMARY KEY,
    AUTHORIZATION_CODE TEXT NULL
);
"#;
