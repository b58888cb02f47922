use ethnum::U256;

use crate::{errors::Error, Balance};

/// `a * b / denominator`, floored, with a 256-bit intermediate.
///
/// Returns [`Error::Overflow`] for a zero denominator or a quotient that
/// does not fit `Balance`.
pub fn mul_div(a: Balance, b: Balance, denominator: Balance) -> Result<Balance, Error> {
    if denominator == 0 {
        return Err(Error::Overflow);
    }
    let quotient = U256::from(a) * U256::from(b) / U256::from(denominator);
    if quotient > U256::from(Balance::MAX) {
        return Err(Error::Overflow);
    }
    Ok(quotient.as_u128())
}
