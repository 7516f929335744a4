use std::ops::Range;

use alloy::primitives::U256;
use itertools::Itertools;

use crate::{
    config::ImageTable,
    error::LaunchpadError,
    types::{SaleIndex, SaleRecord, TokenView},
};

/// Token views ordered newest first, never longer than the cap they were
/// built with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Listings {
    tokens: Vec<TokenView>,
}

impl Listings {
    pub fn len(&self) -> usize { self.tokens.len() }

    pub fn is_empty(&self) -> bool { self.tokens.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenView> { self.tokens.iter() }

    pub fn as_slice(&self) -> &[TokenView] { &self.tokens }

    /// Newest listing.
    pub fn first(&self) -> Option<&TokenView> { self.tokens.first() }

    /// Listing created at the given index, if within the window.
    pub fn get(&self, index: SaleIndex) -> Option<&TokenView> {
        self.tokens.iter().find(|t| t.index() == index)
    }

    /// Creation indices in display order.
    pub fn indices(&self) -> Vec<SaleIndex> { self.tokens.iter().map(TokenView::index).collect() }
}

impl<'a> IntoIterator for &'a Listings {
    type Item = &'a TokenView;
    type IntoIter = std::slice::Iter<'a, TokenView>;

    fn into_iter(self) -> Self::IntoIter { self.tokens.iter() }
}

/// Creation indices of the newest `max` sales out of `total`, ascending.
pub fn window(total: U256, max: usize) -> Result<Range<SaleIndex>, LaunchpadError> {
    let total = SaleIndex::try_from(total).map_err(|_| {
        LaunchpadError::InvalidArgument(format!("total tokens {total} exceeds supported range"))
    })?;
    let len = total.min(max as SaleIndex);
    Ok(total - len..total)
}

/// Fetches sale records of the window sequentially, oldest first, pairs each
/// with the image at the same index, and orders the result newest first.
///
/// Any failed fetch fails the whole build, so a partial list is never
/// produced.
pub async fn build_listings<F, Fut>(
    total: U256,
    max: usize,
    images: &ImageTable,
    mut fetch: F,
) -> Result<Listings, LaunchpadError>
where
    F: FnMut(SaleIndex) -> Fut,
    Fut: Future<Output = Result<SaleRecord, LaunchpadError>>,
{
    let window = window(total, max)?;
    let mut fetched = Vec::with_capacity((window.end - window.start) as usize);
    for index in window {
        let sale = fetch(index).await?;
        tracing::trace!(index, name = %sale.name, "fetched sale");
        fetched.push(TokenView::new(index, sale, images.get(index).map(str::to_owned)));
    }
    Ok(Listings { tokens: fetched.into_iter().rev().collect_vec() })
}
