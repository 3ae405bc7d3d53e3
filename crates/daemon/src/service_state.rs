use common::dispatch::Dispatcher;

use crate::database::{Database, DatabaseSetupError};
use crate::outbox::OutboxTransport;
use crate::uploads::Uploads;
use crate::ServiceConfig;

/// Shared state handed to every request handler
#[derive(Clone, Debug)]
pub struct State {
    database: Database,
    uploads: Uploads,
    dispatcher: Dispatcher<Database, OutboxTransport>,
    max_upload_bytes: usize,
    auto_send_on_upload: bool,
}

impl State {
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        let database_url = match &config.sqlite_path {
            Some(path) => url::Url::parse(&format!("sqlite://{}", path.display()))
                .map_err(StateSetupError::DatabaseUrl)?,
            None => {
                tracing::warn!("no sqlite path configured, records will not survive a restart");
                url::Url::parse("sqlite::memory:").map_err(StateSetupError::DatabaseUrl)?
            }
        };
        let database = Database::connect(&database_url).await?;

        let transport = OutboxTransport::new(&config.outbox_dir, config.mail_from.clone());
        let dispatcher = Dispatcher::new(database.clone(), transport, config.signing_key.clone());

        tracing::info!(
            sender_key = ?config.signing_key.verifying_key(),
            uploads = %config.uploads_dir.display(),
            outbox = %config.outbox_dir.display(),
            "service state ready"
        );

        Ok(Self {
            database,
            uploads: Uploads::new(&config.uploads_dir),
            dispatcher,
            max_upload_bytes: config.max_upload_bytes,
            auto_send_on_upload: config.auto_send_on_upload,
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn uploads(&self) -> &Uploads {
        &self.uploads
    }

    pub fn dispatcher(&self) -> &Dispatcher<Database, OutboxTransport> {
        &self.dispatcher
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn auto_send_on_upload(&self) -> bool {
        self.auto_send_on_upload
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("invalid database url: {0}")]
    DatabaseUrl(url::ParseError),
    #[error(transparent)]
    Database(#[from] DatabaseSetupError),
}
