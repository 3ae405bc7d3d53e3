use clap::{Args, Subcommand};

pub mod download;
pub mod list;
pub mod publish;

use crate::cli::op::Op;
use medseal_daemon::http_server::api::v0::keys::ListRequest;

crate::command_enum! {
    (Publish, publish::Publish),
    (List, ListRequest),
    (Download, download::Download),
}

pub type KeysCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Keys {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[async_trait::async_trait]
impl Op for Keys {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

/// One line per key, shared by publish and list
pub(crate) fn key_line(key: &common::directory::KeyRecord) -> String {
    format!(
        "{} {} {} {} {}",
        key.id, key.uid, key.email, key.role, key.key_type
    )
}
