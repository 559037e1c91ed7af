use clap::{Parser, Subcommand};

mod db;
mod promotion;

#[derive(Debug, Parser)]
#[command(name = "checkout-app", about = "Checkout operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Promotion(promotion::PromotionCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Promotion(command) => promotion::run(command).await,
        }
    }
}
