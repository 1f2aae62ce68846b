use rust_decimal::Decimal;

use crate::engine::availability::TimeRange;
use crate::models::money;
use crate::utils::{AppError, AppResult};

const SECONDS_PER_HOUR: i64 = 3600;
const HOURS_PER_DAY: i64 = 24;

/// Up to a day is billed by the hour; anything longer is billed as fractional
/// days at the daily rate. Amounts are rounded to cents and must fit the
/// money column.
pub fn quote(
    range: &TimeRange,
    price_per_hour: Decimal,
    price_per_day: Decimal,
) -> AppResult<Decimal> {
    let hours = Decimal::from(range.duration().num_seconds()) / Decimal::from(SECONDS_PER_HOUR);
    let day = Decimal::from(HOURS_PER_DAY);

    let amount = if hours <= day {
        hours.checked_mul(price_per_hour)
    } else {
        hours
            .checked_div(day)
            .and_then(|days| days.checked_mul(price_per_day))
    }
    .map(|amount| amount.round_dp(money::MONEY_SCALE))
    .filter(|amount| *amount <= money::max_amount());

    amount.ok_or_else(|| {
        AppError::ValidationError(format!(
            "Booking total would exceed {}",
            money::max_amount()
        ))
    })
}
