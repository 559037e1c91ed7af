use checkout_app::domain::promotions::PromotionsService;
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct GenerateCodeArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: GenerateCodeArgs) -> Result<(), String> {
    let code = super::service(&args.database_url)
        .await?
        .generate_code()
        .await
        .map_err(|error| format!("failed to generate code: {error}"))?;

    println!("{code}");

    Ok(())
}
