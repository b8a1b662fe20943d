//! Request validator
//!
//! Static checks run before admission and pricing; post-execution checks run on the
//! ledger's reported result. All checks fail fast with the first broken rule.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use swapgate_config::defaults;
use swapgate_config::ValidationLimits;
use swapgate_types::{SwapRequest, BPS_DENOMINATOR};
use tracing::debug;

use crate::error::{ValidationError, ValidationErrorKind};

static IDEMPOTENCY_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static pattern compiles"));

/// Stateless validator configured with immutable limits
#[derive(Debug, Clone)]
pub struct RequestValidator {
    limits: ValidationLimits,
    max_key_length: usize,
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new(ValidationLimits::default())
    }
}

impl RequestValidator {
    pub fn new(limits: ValidationLimits) -> Self {
        Self {
            limits,
            max_key_length: defaults::idempotency::MAX_KEY_LENGTH,
        }
    }

    /// Override the maximum accepted idempotency key length
    pub fn with_max_key_length(mut self, max_key_length: usize) -> Self {
        self.max_key_length = max_key_length;
        self
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    pub fn validate_input_amount(&self, amount: Decimal) -> Result<(), ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::new(
                ValidationErrorKind::AmountNonPositive,
                format!("amount_in must be positive, got {}", amount),
            ));
        }
        if amount < self.limits.min_swap_amount {
            return Err(ValidationError::new(
                ValidationErrorKind::AmountTooSmall,
                format!(
                    "amount_in {} below minimum {}",
                    amount, self.limits.min_swap_amount
                ),
            ));
        }
        Ok(())
    }

    /// Zero is a valid floor (no slippage protection requested)
    pub fn validate_min_output(&self, min_output: Decimal) -> Result<(), ValidationError> {
        if min_output < Decimal::ZERO {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidMinOutput,
                format!("min_output cannot be negative, got {}", min_output),
            ));
        }
        Ok(())
    }

    pub fn validate_max_price_impact(&self, max_bps: i32) -> Result<(), ValidationError> {
        let cap = self.limits.max_price_impact_bps.min(BPS_DENOMINATOR as i32);
        if max_bps < 0 || max_bps > cap {
            return Err(ValidationError::new(
                ValidationErrorKind::PriceImpactCapInvalid,
                format!("max_price_impact_bps {} outside [0, {}]", max_bps, cap),
            ));
        }
        Ok(())
    }

    /// Both symbols present and distinct (compared trimmed, ignoring ASCII case)
    pub fn validate_token_pair(&self, input: &str, output: &str) -> Result<(), ValidationError> {
        let (input, output) = (input.trim(), output.trim());
        if input.is_empty() || output.is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidTokenPair,
                "input and output symbols are required",
            ));
        }
        if input.eq_ignore_ascii_case(output) {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidTokenPair,
                format!("input and output symbols must differ, both are {}", input),
            ));
        }
        Ok(())
    }

    /// Clamp a requested deadline horizon
    ///
    /// Non-positive requests get the default horizon; requests above the maximum are
    /// silently capped rather than rejected.
    pub fn cap_deadline_seconds(&self, requested_seconds: i64) -> i64 {
        if requested_seconds <= 0 {
            self.limits.default_deadline_seconds
        } else {
            requested_seconds.min(self.limits.max_deadline_seconds)
        }
    }

    /// Absolute deadline for a request arriving at `now`
    pub fn deadline_from(&self, requested_seconds: i64, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::seconds(self.cap_deadline_seconds(requested_seconds))
    }

    /// A deadline equal to `now` is still valid
    pub fn validate_deadline_not_expired(
        &self,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if now > deadline {
            return Err(ValidationError::new(
                ValidationErrorKind::DeadlineExpired,
                format!("deadline {} has passed (now {})", deadline, now),
            ));
        }
        Ok(())
    }

    /// Reject trades larger than `max_swap_ratio` of the input-side reserve
    pub fn validate_swap_ratio(
        &self,
        amount_in: Decimal,
        reserve: Decimal,
    ) -> Result<(), ValidationError> {
        if reserve <= Decimal::ZERO {
            return Err(ValidationError::new(
                ValidationErrorKind::PoolEmpty,
                "pool has no liquidity",
            ));
        }

        let ratio = amount_in
            .checked_div(reserve)
            .map(|r| {
                r.round_dp_with_strategy(
                    self.limits.ratio_scale,
                    RoundingStrategy::MidpointAwayFromZero,
                )
            })
            .unwrap_or(Decimal::MAX);

        if ratio > self.limits.max_swap_ratio {
            return Err(ValidationError::new(
                ValidationErrorKind::SwapRatioExceeded,
                format!(
                    "amount_in {} is {} of reserve {}, above {}",
                    amount_in, ratio, reserve, self.limits.max_swap_ratio
                ),
            ));
        }
        Ok(())
    }

    /// Post-execution: the trade delivered at least the requested floor
    pub fn validate_min_output_met(
        &self,
        actual_output: Decimal,
        min_output: Decimal,
    ) -> Result<(), ValidationError> {
        if actual_output < min_output {
            return Err(ValidationError::new(
                ValidationErrorKind::MinOutputNotMet,
                format!("output {} below minimum {}", actual_output, min_output),
            ));
        }
        Ok(())
    }

    /// Post-execution: realised price impact stayed within the client's cap
    pub fn validate_price_impact(
        &self,
        actual_bps: u32,
        max_bps: i32,
    ) -> Result<(), ValidationError> {
        if i64::from(actual_bps) > i64::from(max_bps) {
            return Err(ValidationError::new(
                ValidationErrorKind::PriceImpactExceeded,
                format!("price impact {} bps exceeds cap {} bps", actual_bps, max_bps),
            ));
        }
        Ok(())
    }

    /// Run every static check on a request
    ///
    /// Order: amount, min output, impact cap, token pair, deadline. The first failure
    /// is returned.
    pub fn validate_request(
        &self,
        request: &SwapRequest,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let result = self
            .validate_input_amount(request.amount_in)
            .and_then(|_| self.validate_min_output(request.min_output))
            .and_then(|_| self.validate_max_price_impact(request.max_price_impact_bps))
            .and_then(|_| self.validate_token_pair(&request.input_symbol, &request.output_symbol))
            .and_then(|_| self.validate_deadline_not_expired(request.deadline, now));

        if let Err(e) = &result {
            debug!(kind = %e.kind, details = %e.details, "Swap request rejected");
        }
        result
    }

    /// Client idempotency keys: non-empty, bounded, `[A-Za-z0-9_-]` only
    pub fn validate_idempotency_key(&self, key: &str) -> Result<(), ValidationError> {
        if key.is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidIdempotencyKey,
                "idempotency key cannot be empty",
            ));
        }
        if key.len() > self.max_key_length {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidIdempotencyKey,
                format!(
                    "idempotency key length {} exceeds {}",
                    key.len(),
                    self.max_key_length
                ),
            ));
        }
        if !IDEMPOTENCY_KEY_PATTERN.is_match(key) {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidIdempotencyKey,
                "idempotency key may only contain letters, digits, '-' and '_'",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn validator() -> RequestValidator {
        RequestValidator::default()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn request() -> SwapRequest {
        SwapRequest {
            input_symbol: "ETH".to_string(),
            output_symbol: "USDC".to_string(),
            amount_in: dec!(1),
            min_output: dec!(1900),
            max_price_impact_bps: 200,
            deadline: now() + Duration::seconds(600),
        }
    }

    fn kind_of(result: Result<(), ValidationError>) -> ValidationErrorKind {
        result.unwrap_err().kind
    }

    #[test]
    fn test_input_amount_rules() {
        let v = validator();
        assert_eq!(kind_of(v.validate_input_amount(dec!(0))), ValidationErrorKind::AmountNonPositive);
        assert_eq!(kind_of(v.validate_input_amount(dec!(-5))), ValidationErrorKind::AmountNonPositive);
        assert_eq!(
            kind_of(v.validate_input_amount(dec!(0.0000009))),
            ValidationErrorKind::AmountTooSmall
        );
        assert!(v.validate_input_amount(dec!(0.000001)).is_ok());
    }

    #[test]
    fn test_min_output_and_impact_cap() {
        let v = validator();
        assert!(v.validate_min_output(dec!(0)).is_ok());
        assert_eq!(kind_of(v.validate_min_output(dec!(-0.1))), ValidationErrorKind::InvalidMinOutput);

        assert!(v.validate_max_price_impact(0).is_ok());
        assert!(v.validate_max_price_impact(1_000).is_ok());
        assert_eq!(
            kind_of(v.validate_max_price_impact(1_001)),
            ValidationErrorKind::PriceImpactCapInvalid
        );
        assert_eq!(
            kind_of(v.validate_max_price_impact(-1)),
            ValidationErrorKind::PriceImpactCapInvalid
        );
    }

    #[test]
    fn test_token_pair_rules() {
        let v = validator();
        assert!(v.validate_token_pair("ETH", "USDC").is_ok());
        assert_eq!(kind_of(v.validate_token_pair("", "USDC")), ValidationErrorKind::InvalidTokenPair);
        assert_eq!(kind_of(v.validate_token_pair("ETH", "   ")), ValidationErrorKind::InvalidTokenPair);
        assert_eq!(kind_of(v.validate_token_pair("ETH", "ETH")), ValidationErrorKind::InvalidTokenPair);
        assert_eq!(kind_of(v.validate_token_pair("eth", "ETH ")), ValidationErrorKind::InvalidTokenPair);
    }

    #[test]
    fn test_deadline_capping() {
        let v = validator();
        assert_eq!(v.cap_deadline_seconds(0), 600);
        assert_eq!(v.cap_deadline_seconds(-30), 600);
        assert_eq!(v.cap_deadline_seconds(120), 120);
        assert_eq!(v.cap_deadline_seconds(3_600), 3_600);
        assert_eq!(v.cap_deadline_seconds(86_400), 3_600);

        assert_eq!(v.deadline_from(86_400, now()), now() + Duration::hours(1));
    }

    #[test]
    fn test_deadline_expiry() {
        let v = validator();
        assert!(v.validate_deadline_not_expired(now(), now()).is_ok());
        assert_eq!(
            kind_of(v.validate_deadline_not_expired(now() - Duration::seconds(1), now())),
            ValidationErrorKind::DeadlineExpired
        );
    }

    #[test]
    fn test_swap_ratio_boundary() {
        let v = validator();
        assert!(v.validate_swap_ratio(dec!(50), dec!(100)).is_ok());
        assert_eq!(
            kind_of(v.validate_swap_ratio(dec!(51), dec!(100))),
            ValidationErrorKind::SwapRatioExceeded
        );
        assert_eq!(
            kind_of(v.validate_swap_ratio(dec!(1), dec!(0))),
            ValidationErrorKind::PoolEmpty
        );
        // 0.50000000004 rounds to 0.5 at ten places
        assert!(v.validate_swap_ratio(dec!(50.000000004), dec!(100)).is_ok());
    }

    #[test]
    fn test_post_execution_checks() {
        let v = validator();
        assert!(v.validate_min_output_met(dec!(100), dec!(100)).is_ok());
        assert_eq!(
            kind_of(v.validate_min_output_met(dec!(99.99), dec!(100))),
            ValidationErrorKind::MinOutputNotMet
        );
        assert!(v.validate_price_impact(50, 50).is_ok());
        assert_eq!(
            kind_of(v.validate_price_impact(51, 50)),
            ValidationErrorKind::PriceImpactExceeded
        );
    }

    #[test]
    fn test_validate_request_reports_first_failure() {
        let v = validator();
        assert!(v.validate_request(&request(), now()).is_ok());

        let mut bad = request();
        bad.amount_in = dec!(0);
        bad.input_symbol = "USDC".to_string();
        assert_eq!(kind_of(v.validate_request(&bad, now())), ValidationErrorKind::AmountNonPositive);

        let mut bad = request();
        bad.max_price_impact_bps = -1;
        bad.deadline = now() - Duration::seconds(1);
        assert_eq!(
            kind_of(v.validate_request(&bad, now())),
            ValidationErrorKind::PriceImpactCapInvalid
        );

        let mut bad = request();
        bad.deadline = now() - Duration::seconds(1);
        assert_eq!(kind_of(v.validate_request(&bad, now())), ValidationErrorKind::DeadlineExpired);
    }

    #[test]
    fn test_idempotency_keys() {
        let v = validator();
        assert!(v.validate_idempotency_key("swap-2025_01-abc").is_ok());
        assert!(v.validate_idempotency_key(&"k".repeat(255)).is_ok());

        for bad in ["", "has space", "semi;colon", "ünïcode"] {
            assert_eq!(
                kind_of(v.validate_idempotency_key(bad)),
                ValidationErrorKind::InvalidIdempotencyKey
            );
        }
        assert!(v.validate_idempotency_key(&"k".repeat(256)).is_err());

        let short = RequestValidator::default().with_max_key_length(8);
        assert!(short.validate_idempotency_key("123456789").is_err());
    }

    #[test]
    fn test_error_display_carries_code() {
        let err = validator().validate_input_amount(dec!(0)).unwrap_err();
        assert!(err.to_string().starts_with("AMOUNT_NON_POSITIVE: "));
        assert!(!err.kind.is_post_execution());
    }
}
