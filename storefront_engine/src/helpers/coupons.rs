//! Coupon evaluation.
//!
//! Evaluating a coupon is a pure computation over the coupon, the order subtotal and the current
//! time; it has no side effects and can be re-run freely. The order flow calls it while pricing a
//! cart, and callers that want to pre-validate a code before checkout go through
//! [`crate::OrderFlowApi::validate_coupon`], which layers the usage-limit check on top.

use chrono::{DateTime, Utc};
use sf_common::Money;
use thiserror::Error;

use crate::db_types::{Coupon, DiscountType};

#[derive(Debug, Clone, Error)]
pub enum CouponError {
    #[error("Coupon {code} expired at {expired_at}")]
    Expired { code: String, expired_at: DateTime<Utc> },
    #[error("Order subtotal {subtotal} does not meet the coupon minimum of {min_amount}")]
    MinimumNotMet { code: String, subtotal: Money, min_amount: Money },
}

/// Computes the discount a coupon grants against an order subtotal.
///
/// Fails if the coupon has expired or the subtotal is below the coupon's minimum. The result is
/// clamped to the subtotal, so the discount can never push a grand total below zero.
pub fn evaluate_coupon(coupon: &Coupon, subtotal: Money, now: DateTime<Utc>) -> Result<Money, CouponError> {
    if coupon.expires_at < now {
        return Err(CouponError::Expired { code: coupon.code.clone(), expired_at: coupon.expires_at });
    }
    if subtotal < coupon.min_amount {
        return Err(CouponError::MinimumNotMet { code: coupon.code.clone(), subtotal, min_amount: coupon.min_amount });
    }
    let raw = match coupon.discount_type {
        DiscountType::Percent => subtotal.percent(coupon.value.amount()),
        DiscountType::Fixed => coupon.value,
    };
    Ok(raw.min(subtotal))
}

#[cfg(test)]
mod test {
    use chrono::Duration;

    use super::*;

    fn coupon(discount_type: DiscountType, value: &str, min_amount: &str, expires_at: DateTime<Utc>) -> Coupon {
        Coupon {
            id: 1,
            code: "SAVE".to_string(),
            discount_type,
            value: value.parse().unwrap(),
            min_amount: min_amount.parse().unwrap(),
            expires_at,
            usage_limit: 1,
            created_at: expires_at - Duration::days(30),
        }
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn fixed_discount_applies_above_minimum() {
        let now = Utc::now();
        let c = coupon(DiscountType::Fixed, "30.00", "100.00", now + Duration::days(1));
        let discount = evaluate_coupon(&c, money("250.00"), now).unwrap();
        assert_eq!(discount, money("30.00"));
    }

    #[test]
    fn percent_discount_is_exact() {
        let now = Utc::now();
        let c = coupon(DiscountType::Percent, "10", "0.00", now + Duration::days(1));
        let discount = evaluate_coupon(&c, money("250.00"), now).unwrap();
        assert_eq!(discount, money("25.00"));
    }

    #[test]
    fn minimum_not_met_is_rejected() {
        let now = Utc::now();
        let c = coupon(DiscountType::Percent, "10", "300.00", now + Duration::days(1));
        let err = evaluate_coupon(&c, money("250.00"), now).unwrap_err();
        assert!(matches!(err, CouponError::MinimumNotMet { .. }));
    }

    #[test]
    fn expired_coupons_are_rejected() {
        let now = Utc::now();
        let c = coupon(DiscountType::Fixed, "30.00", "0.00", now - Duration::seconds(1));
        let err = evaluate_coupon(&c, money("250.00"), now).unwrap_err();
        assert!(matches!(err, CouponError::Expired { .. }));
    }

    #[test]
    fn discount_is_clamped_to_the_subtotal() {
        let now = Utc::now();
        let c = coupon(DiscountType::Fixed, "500.00", "0.00", now + Duration::days(1));
        let discount = evaluate_coupon(&c, money("250.00"), now).unwrap();
        assert_eq!(discount, money("250.00"));

        let c = coupon(DiscountType::Percent, "150", "0.00", now + Duration::days(1));
        let discount = evaluate_coupon(&c, money("40.00"), now).unwrap();
        assert_eq!(discount, money("40.00"));
    }

    #[test]
    fn subtotal_exactly_at_minimum_is_accepted() {
        let now = Utc::now();
        let c = coupon(DiscountType::Fixed, "10.00", "100.00", now + Duration::days(1));
        assert!(evaluate_coupon(&c, money("100.00"), now).is_ok());
    }
}
