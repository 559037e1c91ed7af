use checkout::{PromotionCode, PromotionKind, PromotionStatus};
use checkout_app::domain::promotions::{PromotionsService, models::NewPromotion};
use clap::Args;
use jiff::Timestamp;
use rust_decimal::Decimal;

#[derive(Debug, Args)]
pub(crate) struct CreatePromotionArgs {
    /// Code shoppers enter; generated when omitted
    #[arg(long)]
    code: Option<PromotionCode>,

    /// `percentage` or `fixed`
    #[arg(long)]
    kind: PromotionKind,

    /// Percent off, or amount off for fixed promotions
    #[arg(long)]
    value: Decimal,

    /// Minimum subtotal required
    #[arg(long)]
    min_order_amount: Option<Decimal>,

    /// Cap on the discount
    #[arg(long)]
    max_discount: Option<Decimal>,

    /// Maximum number of redemptions
    #[arg(long)]
    usage_limit: Option<u64>,

    /// Start of the validity window; now when omitted
    #[arg(long)]
    valid_from: Option<Timestamp>,

    /// End of the validity window
    #[arg(long)]
    valid_until: Option<Timestamp>,

    /// `active`, `inactive` or `expired`
    #[arg(long, default_value = "active")]
    status: PromotionStatus,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreatePromotionArgs) -> Result<(), String> {
    let service = super::service(&args.database_url).await?;

    let promotion = service
        .create_promotion(NewPromotion {
            code: args.code,
            kind: args.kind,
            value: args.value,
            min_order_amount: args.min_order_amount,
            max_discount: args.max_discount,
            usage_limit: args.usage_limit,
            valid_from: args.valid_from,
            valid_until: args.valid_until,
            status: args.status,
        })
        .await
        .map_err(|error| format!("failed to create promotion: {error}"))?;

    println!("promotion_uuid: {}", promotion.uuid);
    println!("code: {}", promotion.code);

    Ok(())
}
