use alloy::primitives::{U256, utils::format_units};
use fastnum::UD256;

use crate::error::LaunchpadError;

/// Converter of raw fixed-point on-chain amounts to decimal numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Converter {
    decimals: u8,
}

impl Converter {
    /// Native currency with 18 decimals.
    pub const ETHER: Self = Self { decimals: 18 };

    pub const fn new(decimals: u8) -> Self { Self { decimals } }

    pub fn decimals(&self) -> u8 { self.decimals }

    /// Converts raw amount into decimal with the configured number of
    /// decimals.
    pub fn from_unsigned(&self, value: U256) -> Result<UD256, LaunchpadError> {
        let formatted = format_units(value, self.decimals)
            .map_err(|err| LaunchpadError::InvalidArgument(err.to_string()))?;
        formatted
            .parse::<UD256>()
            .map_err(|err| LaunchpadError::InvalidArgument(format!("{formatted}: {err}")))
    }

    /// Decimal rendering of the raw amount, falling back to raw units if the
    /// value does not convert.
    pub fn display(&self, value: U256) -> String {
        self.from_unsigned(value)
            .map(|d| d.to_string())
            .unwrap_or_else(|_| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use fastnum::udec256;

    use super::*;

    #[test]
    fn test_from_unsigned() {
        let ether = Converter::ETHER;
        assert_eq!(
            ether.from_unsigned(U256::from(1_500_000_000_000_000_000u128)).unwrap(),
            udec256!(1.5)
        );
        assert_eq!(ether.from_unsigned(U256::ZERO).unwrap(), UD256::ZERO);
        assert_eq!(Converter::new(2).from_unsigned(U256::from(12345)).unwrap(), udec256!(123.45));
    }
}
