use clap::Args;
use jiff::Timestamp;
use tally_app::{
    database::{self, DEFAULT_MAX_CONNECTIONS, Db},
    domain::coupons::{
        CouponsService, PgCouponsService,
        data::NewCoupon,
        records::CouponUuid,
    },
};

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    /// Unique coupon code users claim with
    #[arg(long)]
    code: String,

    /// Human readable title
    #[arg(long)]
    title: String,

    /// Discount granted when the coupon is used
    #[arg(long)]
    discount_value: u64,

    /// Expiry as an RFC 3339 timestamp, e.g. 2030-01-01T00:00:00Z
    #[arg(long)]
    expires_at: Timestamp,

    /// Maximum number of issuances; unlimited when omitted
    #[arg(long)]
    total_quantity: Option<u32>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url, DEFAULT_MAX_CONNECTIONS)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCouponsService::new(Db::new(pool));

    let coupon = service
        .create_coupon(NewCoupon {
            uuid: CouponUuid::new(),
            code: args.code,
            title: args.title,
            discount_value: args.discount_value,
            expires_at: args.expires_at,
            total_quantity: args.total_quantity,
        })
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", coupon.uuid);
    println!("coupon_code: {}", coupon.code);
    println!("expires_at: {}", coupon.expires_at);

    match coupon.total_quantity {
        Some(total) => println!("total_quantity: {total}"),
        None => println!("total_quantity: unlimited"),
    }

    Ok(())
}
