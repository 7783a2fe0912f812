use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    MySql, Pool,
};

use super::environment::{Config, DatabaseTarget};

pub type DbPool = Pool<MySql>;

/// Builds driver options without round-tripping the parts through a URL,
/// so reserved characters in credentials stay literal.
pub fn connect_options(target: &DatabaseTarget) -> Result<MySqlConnectOptions, sqlx::Error> {
    match target {
        DatabaseTarget::Url(url) => url.parse(),
        DatabaseTarget::Parts {
            host,
            port,
            user,
            password,
            name,
        } => Ok(MySqlConnectOptions::new()
            .host(host)
            .port(*port)
            .username(user)
            .password(password)
            .database(name)),
    }
}

/// Connects the shared pool and applies pending migrations.
pub async fn init_db(config: &Config) -> Result<DbPool, sqlx::Error> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(connect_options(&config.database)?)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
