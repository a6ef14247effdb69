use std::sync::Arc;

use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tracing::info;

use crate::{
    config::Config,
    consts::db_const::{
        APPLICATION_TABLE, DEADLINE_INDEX, OPPORTUNITY_TABLE, UNIQUE_APPLICATION_INDEX,
    },
    errors::Result,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub sdb: Surreal<Any>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn init(config: Config) -> Result<Self> {
        let sdb = any::connect(config.db.endpoint.as_str()).await?;
        if let (Some(username), Some(password)) = (&config.db.username, &config.db.password) {
            sdb.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await?;
        }
        sdb.use_ns(config.db.namespace.as_str())
            .use_db(config.db.database.as_str())
            .await?;
        info!(endpoint = %config.db.endpoint, "connected to document store");

        define_schema(&sdb).await?;

        Ok(Self {
            sdb,
            config: Arc::new(config),
        })
    }

    #[cfg(test)]
    pub async fn for_tests() -> Self {
        Self::init(Config::for_tests()).await.expect("in-memory state")
    }
}

/// The unique index is what keeps one application per applicant and post
/// when two submissions race past the existence check.
async fn define_schema(sdb: &Surreal<Any>) -> Result<()> {
    sdb.query(format!(
        "DEFINE INDEX IF NOT EXISTS {UNIQUE_APPLICATION_INDEX} ON TABLE {APPLICATION_TABLE} FIELDS applicant_email, postId UNIQUE;"
    ))
    .query(format!(
        "DEFINE INDEX IF NOT EXISTS {DEADLINE_INDEX} ON TABLE {OPPORTUNITY_TABLE} FIELDS deadline;"
    ))
    .await?
    .check()?;
    info!("schema indexes defined");
    Ok(())
}
