use std::sync::Arc;

use checkout_app::{
    database::{self, Db},
    domain::promotions::{DefaultPromotionsService, PgPromotionStore},
};
use clap::{Args, Subcommand};

mod create;
mod generate_code;
mod list;

#[derive(Debug, Args)]
pub(crate) struct PromotionCommand {
    #[command(subcommand)]
    command: PromotionSubcommand,
}

#[derive(Debug, Subcommand)]
enum PromotionSubcommand {
    /// Create a promotion code
    Create(create::CreatePromotionArgs),

    /// Print an unused random code
    GenerateCode(generate_code::GenerateCodeArgs),

    /// List every promotion
    List(list::ListPromotionsArgs),
}

pub(crate) async fn run(command: PromotionCommand) -> Result<(), String> {
    match command.command {
        PromotionSubcommand::Create(args) => create::run(args).await,
        PromotionSubcommand::GenerateCode(args) => generate_code::run(args).await,
        PromotionSubcommand::List(args) => list::run(args).await,
    }
}

async fn service(database_url: &str) -> Result<DefaultPromotionsService, String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(DefaultPromotionsService::new(Arc::new(PgPromotionStore::new(
        Db::new(pool),
    ))))
}
