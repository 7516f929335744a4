use alloy::{
    eips::BlockId,
    primitives::{Address, Bytes, U256},
};
use alloy_sol_types::SolCall;

use crate::{
    abi::Factory,
    error::LaunchpadError,
    source::ChainSource,
    types::{SaleIndex, SaleRecord, StateInstant},
};

/// Factory bound to an address verified to carry code on a particular chain.
///
/// Only [`crate::network::verify_deployment`] produces handles, so holding one
/// implies the check passed at [`Self::instant`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FactoryHandle {
    chain_id: u64,
    address: Address,
    instant: StateInstant,
}

impl FactoryHandle {
    pub(crate) fn new(chain_id: u64, address: Address, instant: StateInstant) -> Self {
        Self { chain_id, address, instant }
    }

    pub fn chain_id(&self) -> u64 { self.chain_id }

    pub fn address(&self) -> Address { self.address }

    /// Instant the code presence was verified at.
    pub fn instant(&self) -> StateInstant { self.instant }

    /// Read accessor pinned at the verification instant.
    pub fn reader<'a, S: ChainSource>(&'a self, source: &'a S) -> FactoryReader<'a, S> {
        FactoryReader { source, handle: self }
    }
}

/// Typed read-only access to the factory.
pub struct FactoryReader<'a, S> {
    source: &'a S,
    handle: &'a FactoryHandle,
}

impl<'a, S: ChainSource> FactoryReader<'a, S> {
    fn block(&self) -> BlockId { BlockId::number(self.handle.instant.block_number()) }

    /// Listing fee in native currency units.
    pub async fn fee(&self) -> Result<U256, LaunchpadError> {
        self.source.fee(self.handle.address, self.block()).await
    }

    /// Number of sales ever created.
    pub async fn total_tokens(&self) -> Result<U256, LaunchpadError> {
        self.source
            .total_tokens(self.handle.address, self.block())
            .await
    }

    /// Sale created at `index`, which has to be below `total` as returned
    /// by [`Self::total_tokens`].
    pub async fn token_sale(
        &self,
        index: SaleIndex,
        total: U256,
    ) -> Result<SaleRecord, LaunchpadError> {
        let index = U256::from(index);
        if index >= total {
            return Err(LaunchpadError::InvalidArgument(format!(
                "sale index {index} out of range, total {total}"
            )));
        }
        self.source
            .token_sale(self.handle.address, index, self.block())
            .await
    }

    /// Calls `fee()` through untyped `eth_call` and decodes the result.
    ///
    /// Diagnoses ABI mismatches separately from the typed binding.
    pub async fn probe_fee(&self) -> Result<(Bytes, U256), LaunchpadError> {
        let raw = self
            .source
            .call_raw(self.handle.address, Factory::feeCall {}.abi_encode().into(), self.block())
            .await?;
        let fee = Factory::feeCall::abi_decode_returns(&raw)?;
        Ok((raw, fee))
    }
}
