use checkout::money::to_output_string;
use checkout_app::domain::promotions::PromotionsService;
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct ListPromotionsArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ListPromotionsArgs) -> Result<(), String> {
    let promotions = super::service(&args.database_url)
        .await?
        .list_promotions()
        .await
        .map_err(|error| format!("failed to list promotions: {error}"))?;

    for promotion in promotions {
        let terms = &promotion.terms;

        let limit = terms
            .usage_limit
            .map_or_else(|| "unlimited".to_string(), |limit| limit.to_string());

        println!(
            "{}\t{}\t{}\t{}\t{}/{}",
            promotion.code,
            terms.kind.as_str(),
            terms.value,
            terms.min_order_amount.map(to_output_string).unwrap_or_default(),
            terms.usage_count,
            limit,
        );
    }

    Ok(())
}
