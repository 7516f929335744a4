use alloy::primitives::{Address, U256};

use crate::abi::Factory::TokenSale;

/// Point-in-time snapshot of one sale as stored by the factory.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct SaleRecord {
    /// Address of the launched token.
    pub token: Address,

    pub name: String,

    /// Account that created the sale.
    pub creator: Address,

    /// Amount of tokens sold so far (raw token units).
    #[debug("{sold}")]
    pub sold: U256,

    /// Amount of native currency raised so far (wei).
    #[debug("{raised}")]
    pub raised: U256,

    /// Whether the sale still accepts buys.
    pub is_open: bool,
}

impl From<TokenSale> for SaleRecord {
    fn from(sale: TokenSale) -> Self {
        Self {
            token: sale.token,
            name: sale.name,
            creator: sale.creator,
            sold: sale.sold,
            raised: sale.raised,
            is_open: sale.isOpen,
        }
    }
}

/// Sale record enriched with its locally resolved image, as consumed by
/// presentation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TokenView {
    index: super::SaleIndex,
    sale: SaleRecord,
    image: Option<String>,
}

impl TokenView {
    pub fn new(index: super::SaleIndex, sale: SaleRecord, image: Option<String>) -> Self {
        Self { index, sale, image }
    }

    /// Creation index the record was fetched at.
    pub fn index(&self) -> super::SaleIndex { self.index }

    pub fn sale(&self) -> &SaleRecord { &self.sale }

    /// Image reference paired with [`Self::index`] in the image table.
    pub fn image(&self) -> Option<&str> { self.image.as_deref() }

    pub fn token(&self) -> alloy::primitives::Address { self.sale.token }

    pub fn name(&self) -> &str { &self.sale.name }

    pub fn creator(&self) -> alloy::primitives::Address { self.sale.creator }

    pub fn sold(&self) -> U256 { self.sale.sold }

    pub fn raised(&self) -> U256 { self.sale.raised }

    pub fn is_open(&self) -> bool { self.sale.is_open }
}

#[cfg(feature = "display")]
impl tabled::Tabled for TokenView {
    const LENGTH: usize = 7;

    fn fields(&self) -> Vec<std::borrow::Cow<'_, str>> {
        use colored::Colorize;

        let ether = crate::num::Converter::ETHER;
        vec![
            self.index.to_string().into(),
            self.sale.name.clone().into(),
            self.sale.token.to_string().into(),
            self.sale.creator.to_string().into(),
            self.sale.sold.to_string().into(),
            ether.display(self.sale.raised).into(),
            if self.sale.is_open {
                "open".green().to_string().into()
            } else {
                "closed".red().to_string().into()
            },
        ]
    }

    fn headers() -> Vec<std::borrow::Cow<'static, str>> {
        vec![
            "#".into(),
            "Name".into(),
            "Token".into(),
            "Creator".into(),
            "Sold".into(),
            "Raised (ETH)".into(),
            "Status".into(),
        ]
    }
}
