use alloy::primitives::U256;
use thiserror::Error;

/// 1.0 in 18-decimal fixed point.
pub const ONE: U256 = U256::from_limbs([1_000_000_000_000_000_000u64, 0, 0, 0]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixedPointError {
    #[error("fixed-point multiplication overflow")]
    Overflow,

    #[error("fixed-point division by zero")]
    DivisionByZero,
}

/// `a * b / c`, rounding down. Multiply-before-divide to minimize rounding error.
pub fn mul_div_down(a: U256, b: U256, c: U256) -> Result<U256, FixedPointError> {
    if c.is_zero() {
        return Err(FixedPointError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(FixedPointError::Overflow)?;
    Ok(product / c)
}

/// `a * b / 1e18`, rounding down.
pub fn mul_down(a: U256, b: U256) -> Result<U256, FixedPointError> {
    mul_div_down(a, b, ONE)
}

/// `a * 1e18 / b`, rounding down.
pub fn div_down(a: U256, b: U256) -> Result<U256, FixedPointError> {
    mul_div_down(a, ONE, b)
}

/// Scale a raw token amount with `decimals` decimals up to 18-decimal fixed point.
pub fn scale_to_18(raw: U256, decimals: u8) -> Result<U256, FixedPointError> {
    if decimals > 18 {
        let divisor = U256::from(10u64).pow(U256::from(decimals - 18));
        return Ok(raw / divisor);
    }
    let factor = U256::from(10u64).pow(U256::from(18 - decimals));
    raw.checked_mul(factor).ok_or(FixedPointError::Overflow)
}

/// Scale an 18-decimal fixed-point amount back down to `decimals` raw units.
pub fn scale_from_18(scaled: U256, decimals: u8) -> Result<U256, FixedPointError> {
    if decimals > 18 {
        let factor = U256::from(10u64).pow(U256::from(decimals - 18));
        return scaled.checked_mul(factor).ok_or(FixedPointError::Overflow);
    }
    let divisor = U256::from(10u64).pow(U256::from(18 - decimals));
    Ok(scaled / divisor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_is_1e18() {
        assert_eq!(ONE, U256::from(10u64).pow(U256::from(18u64)));
    }

    #[test]
    fn mul_div_rounds_down() {
        let result = mul_div_down(U256::from(10), U256::from(1), U256::from(3)).unwrap();
        assert_eq!(result, U256::from(3));
    }

    #[test]
    fn div_by_zero_is_error() {
        assert_eq!(
            div_down(ONE, U256::ZERO),
            Err(FixedPointError::DivisionByZero)
        );
    }

    #[test]
    fn scale_usdc_to_18() {
        // 500 USDC (6 decimals) -> 500e18
        let scaled = scale_to_18(U256::from(500_000_000u64), 6).unwrap();
        assert_eq!(scaled, U256::from(500u64) * ONE);
    }

    #[test]
    fn scale_from_18_surfaces_overflow() {
        assert_eq!(
            scale_from_18(U256::from(500u64) * ONE, 6).unwrap(),
            U256::from(500_000_000u64)
        );
        assert_eq!(
            scale_from_18(U256::MAX, 24),
            Err(FixedPointError::Overflow)
        );
    }
}
