use alloy::{
    eips::BlockId,
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
};

use crate::{
    abi::Factory::FactoryInstance,
    error::LaunchpadError,
    types::{SaleRecord, StateInstant},
};

/// Read capabilities of the connected chain the synchronization relies on.
///
/// [`RpcSource`] implements it over any alloy [`Provider`], the `testing`
/// module provides an in-memory implementation.
pub trait ChainSource: Send + Sync {
    /// ID of the chain the source is currently attached to.
    fn chain_id(&self) -> impl Future<Output = Result<u64, LaunchpadError>> + Send;

    /// Latest block the subsequent reads can be pinned at.
    fn latest_instant(&self) -> impl Future<Output = Result<StateInstant, LaunchpadError>> + Send;

    /// Deployed code at the address, empty if there is none.
    fn code_at(
        &self,
        address: Address,
        at: BlockId,
    ) -> impl Future<Output = Result<Bytes, LaunchpadError>> + Send;

    /// Untyped `eth_call`.
    fn call_raw(
        &self,
        to: Address,
        input: Bytes,
        at: BlockId,
    ) -> impl Future<Output = Result<Bytes, LaunchpadError>> + Send;

    fn fee(
        &self,
        factory: Address,
        at: BlockId,
    ) -> impl Future<Output = Result<U256, LaunchpadError>> + Send;

    fn total_tokens(
        &self,
        factory: Address,
        at: BlockId,
    ) -> impl Future<Output = Result<U256, LaunchpadError>> + Send;

    fn token_sale(
        &self,
        factory: Address,
        index: U256,
        at: BlockId,
    ) -> impl Future<Output = Result<SaleRecord, LaunchpadError>> + Send;
}

/// [`ChainSource`] backed by JSON-RPC provider.
///
/// It is recommended to setup provider with
/// [`alloy::transports::layers::RetryBackoffLayer`], as synchronization
/// itself never retries.
#[derive(Clone, Debug)]
pub struct RpcSource<P> {
    provider: P,
}

impl<P: Provider + Clone> RpcSource<P> {
    pub fn new(provider: P) -> Self { Self { provider } }

    pub fn provider(&self) -> &P { &self.provider }

    fn factory(&self, address: Address) -> FactoryInstance<P> {
        FactoryInstance::new(address, self.provider.clone())
    }
}

impl<P: Provider + Clone> ChainSource for RpcSource<P> {
    async fn chain_id(&self) -> Result<u64, LaunchpadError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn latest_instant(&self) -> Result<StateInstant, LaunchpadError> {
        let block = self
            .provider
            .get_block(BlockId::latest())
            .await?
            .ok_or_else(|| LaunchpadError::read_call("eth_getBlockByNumber", "no latest block"))?;
        Ok(StateInstant::new(block.header.number, block.header.timestamp))
    }

    async fn code_at(&self, address: Address, at: BlockId) -> Result<Bytes, LaunchpadError> {
        Ok(self.provider.get_code_at(address).block_id(at).await?)
    }

    async fn call_raw(
        &self,
        to: Address,
        input: Bytes,
        at: BlockId,
    ) -> Result<Bytes, LaunchpadError> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(input);
        Ok(self.provider.call(tx).block(at).await?)
    }

    async fn fee(&self, factory: Address, at: BlockId) -> Result<U256, LaunchpadError> {
        self.factory(factory)
            .fee()
            .block(at)
            .call()
            .await
            .map_err(|err| LaunchpadError::read_call("fee", err))
    }

    async fn total_tokens(&self, factory: Address, at: BlockId) -> Result<U256, LaunchpadError> {
        self.factory(factory)
            .totalTokens()
            .block(at)
            .call()
            .await
            .map_err(|err| LaunchpadError::read_call("totalTokens", err))
    }

    async fn token_sale(
        &self,
        factory: Address,
        index: U256,
        at: BlockId,
    ) -> Result<SaleRecord, LaunchpadError> {
        self.factory(factory)
            .getTokenSale(index)
            .block(at)
            .call()
            .await
            .map(SaleRecord::from)
            .map_err(|err| LaunchpadError::read_call("getTokenSale", err))
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{U64, address},
        providers::{ProviderBuilder, RootProvider},
        rpc::types::Block,
        transports::mock::Asserter,
    };
    use alloy_sol_types::SolCall;

    use super::*;
    use crate::{abi::Factory, error::ErrorKind};

    const FACTORY: Address = address!("0x0000000000000000000000000000000000000fac");

    fn source() -> (RpcSource<RootProvider>, Asserter) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone());
        (RpcSource::new(provider), asserter)
    }

    fn uint(value: u64) -> Bytes { Bytes::copy_from_slice(&U256::from(value).to_be_bytes::<32>()) }

    #[tokio::test]
    async fn test_chain_id_and_latest_instant() {
        let (source, asserter) = source();
        asserter.push_success(&U64::from(31337));
        assert_eq!(source.chain_id().await.unwrap(), 31337);

        let mut block: Block = Block::default();
        block.header.inner.number = 42;
        block.header.inner.timestamp = 1_700_000_000;
        asserter.push_success(&block);
        assert_eq!(source.latest_instant().await.unwrap(), StateInstant::new(42, 1_700_000_000));
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_latest_instant_without_block() {
        let (source, asserter) = source();
        asserter.push_success(&serde_json::Value::Null);
        let err = source.latest_instant().await.unwrap_err();
        assert!(matches!(err, LaunchpadError::ReadCall { method: "eth_getBlockByNumber", .. }));
    }

    #[tokio::test]
    async fn test_code_and_raw_call() {
        let (source, asserter) = source();
        let at = BlockId::number(42);

        asserter.push_success(&Bytes::from_static(&[0x60, 0x80]));
        assert_eq!(source.code_at(FACTORY, at).await.unwrap(), Bytes::from_static(&[0x60, 0x80]));

        asserter.push_success(&Bytes::new());
        assert!(source.code_at(FACTORY, at).await.unwrap().is_empty());

        asserter.push_success(&uint(500));
        let input = Bytes::from(Factory::feeCall {}.abi_encode());
        assert_eq!(source.call_raw(FACTORY, input, at).await.unwrap(), uint(500));

        asserter.push_failure_msg("header not found");
        let err = source.code_at(FACTORY, at).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_typed_factory_reads() {
        let (source, asserter) = source();
        let at = BlockId::number(42);

        asserter.push_success(&uint(500));
        assert_eq!(source.fee(FACTORY, at).await.unwrap(), U256::from(500));

        asserter.push_success(&uint(8));
        assert_eq!(source.total_tokens(FACTORY, at).await.unwrap(), U256::from(8));

        let sale = Factory::TokenSale {
            token: Address::with_last_byte(0x17),
            name: "Token 7".to_string(),
            creator: Address::with_last_byte(0xc0),
            sold: U256::from(7_000),
            raised: U256::from(10u64).pow(U256::from(18)),
            isOpen: true,
        };
        asserter.push_success(&Bytes::from(Factory::getTokenSaleCall::abi_encode_returns(&sale)));
        let record = source.token_sale(FACTORY, U256::from(7), at).await.unwrap();
        assert_eq!(record, SaleRecord::from(sale));
        assert_eq!(record.name, "Token 7");
        assert!(record.is_open);
    }

    #[tokio::test]
    async fn test_factory_read_failures() {
        let (source, asserter) = source();
        let at = BlockId::number(42);

        asserter.push_failure_msg("execution reverted");
        let err = source.fee(FACTORY, at).await.unwrap_err();
        assert!(matches!(err, LaunchpadError::ReadCall { method: "fee", .. }));

        // Return data too short for a `TokenSale`.
        asserter.push_success(&uint(1));
        let err = source.token_sale(FACTORY, U256::ZERO, at).await.unwrap_err();
        assert!(matches!(err, LaunchpadError::ReadCall { method: "getTokenSale", .. }));
    }
}
