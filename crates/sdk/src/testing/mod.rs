//! In-memory chain for exercising synchronization without a node.
//!
//! [`MockChain`] serves a single factory's state at any address it has code
//! for, counts calls per RPC method, and can be told to fail or to hold a
//! call until released.

use std::sync::{
    Arc, Mutex, RwLock,
    atomic::{AtomicU64, Ordering},
};

use alloy::{
    eips::BlockId,
    primitives::{Address, Bytes, U256},
    transports::TransportErrorKind,
};
use alloy_sol_types::SolCall;
use dashmap::DashMap;
use tokio::sync::Notify;

use crate::{
    abi::Factory,
    error::LaunchpadError,
    source::ChainSource,
    types::{SaleIndex, SaleRecord, StateInstant},
};

/// Sale record with values derived from the index.
pub fn sale(index: SaleIndex) -> SaleRecord {
    SaleRecord {
        token: Address::with_last_byte(0x10u8.wrapping_add(index as u8)),
        name: format!("Token {index}"),
        creator: Address::with_last_byte(0xc0),
        sold: U256::from(index * 1_000),
        raised: U256::from(index) * U256::from(10u64).pow(U256::from(17)),
        is_open: index % 2 == 0,
    }
}

#[derive(Default)]
struct State {
    chain_id: AtomicU64,
    block_number: AtomicU64,
    code: DashMap<Address, Bytes>,
    fee: RwLock<U256>,
    sales: RwLock<Vec<SaleRecord>>,
    calls: DashMap<&'static str, usize>,
    sale_indices: Mutex<Vec<SaleIndex>>,
    read_blocks: Mutex<Vec<BlockId>>,
    failures: DashMap<&'static str, Option<SaleIndex>>,
    holds: DashMap<&'static str, Arc<Notify>>,
}

/// Cloneable handle to shared in-memory chain state.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<State>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        let chain = Self::default();
        chain.state.chain_id.store(chain_id, Ordering::SeqCst);
        chain.state.block_number.store(1, Ordering::SeqCst);
        chain
    }

    /// Places factory code at the address.
    pub fn with_factory(self, address: Address) -> Self {
        self.set_code(address, Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]));
        self
    }

    pub fn with_fee(self, fee: U256) -> Self {
        self.set_fee(fee);
        self
    }

    pub fn with_sales(self, sales: Vec<SaleRecord>) -> Self {
        *self.state.sales.write().unwrap() = sales;
        self
    }

    /// Switches the chain the source is attached to.
    pub fn set_chain_id(&self, chain_id: u64) { self.state.chain_id.store(chain_id, Ordering::SeqCst) }

    pub fn set_code(&self, address: Address, code: Bytes) { self.state.code.insert(address, code); }

    pub fn set_fee(&self, fee: U256) { *self.state.fee.write().unwrap() = fee; }

    /// Appends a sale and mines a block.
    pub fn push_sale(&self, sale: SaleRecord) {
        self.state.sales.write().unwrap().push(sale);
        self.state.block_number.fetch_add(1, Ordering::SeqCst);
    }

    /// Makes every subsequent call of the method fail.
    pub fn fail(&self, method: &'static str) { self.state.failures.insert(method, None); }

    /// Makes `getTokenSale` fail for one index only.
    pub fn fail_sale_at(&self, index: SaleIndex) {
        self.state.failures.insert("getTokenSale", Some(index));
    }

    pub fn clear_failures(&self) { self.state.failures.clear(); }

    /// Holds the next call of the method until the returned [`Notify`] is
    /// notified.
    pub fn hold_next(&self, method: &'static str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state.holds.insert(method, notify.clone());
        notify
    }

    /// Number of calls of the RPC/contract method so far.
    pub fn calls(&self, method: &str) -> usize {
        self.state.calls.get(method).map(|c| *c).unwrap_or_default()
    }

    /// Total number of factory reads (`fee`, `totalTokens`, `getTokenSale`,
    /// raw `eth_call`).
    pub fn factory_reads(&self) -> usize {
        ["fee", "totalTokens", "getTokenSale", "eth_call"]
            .iter()
            .map(|m| self.calls(m))
            .sum()
    }

    /// Indices `getTokenSale` was called with, in call order.
    pub fn sale_indices(&self) -> Vec<SaleIndex> { self.state.sale_indices.lock().unwrap().clone() }

    /// Blocks `eth_getCode` and factory reads were pinned at, in call order.
    pub fn read_blocks(&self) -> Vec<BlockId> { self.state.read_blocks.lock().unwrap().clone() }

    /// Forgets recorded calls, sale indices and read blocks.
    pub fn reset_calls(&self) {
        self.state.calls.clear();
        self.state.sale_indices.lock().unwrap().clear();
        self.state.read_blocks.lock().unwrap().clear();
    }

    fn pin(&self, at: BlockId) { self.state.read_blocks.lock().unwrap().push(at); }

    async fn enter(&self, method: &'static str, index: Option<SaleIndex>) -> Result<(), LaunchpadError> {
        *self.state.calls.entry(method).or_default() += 1;
        let hold = self.state.holds.remove(method).map(|(_, n)| n);
        if let Some(notify) = hold {
            notify.notified().await;
        }
        let failing = self
            .state
            .failures
            .get(method)
            .is_some_and(|f| f.is_none() || *f == index);
        if failing {
            return Err(LaunchpadError::read_call(method, "execution reverted"));
        }
        Ok(())
    }

    fn has_code(&self, address: Address) -> bool {
        self.state.code.get(&address).is_some_and(|c| !c.is_empty())
    }

    fn ensure_factory(&self, method: &'static str, address: Address) -> Result<(), LaunchpadError> {
        if self.has_code(address) {
            Ok(())
        } else {
            Err(LaunchpadError::read_call(method, format!("no contract at {address}")))
        }
    }
}

impl ChainSource for MockChain {
    async fn chain_id(&self) -> Result<u64, LaunchpadError> {
        self.enter("eth_chainId", None).await.map_err(|_| {
            LaunchpadError::Transport(TransportErrorKind::custom_str("wallet disconnected"))
        })?;
        Ok(self.state.chain_id.load(Ordering::SeqCst))
    }

    async fn latest_instant(&self) -> Result<StateInstant, LaunchpadError> {
        self.enter("eth_getBlockByNumber", None).await?;
        let number = self.state.block_number.load(Ordering::SeqCst);
        Ok(StateInstant::new(number, 1_700_000_000 + number * 12))
    }

    async fn code_at(&self, address: Address, at: BlockId) -> Result<Bytes, LaunchpadError> {
        self.pin(at);
        self.enter("eth_getCode", None).await?;
        Ok(self
            .state
            .code
            .get(&address)
            .map(|c| c.clone())
            .unwrap_or_default())
    }

    async fn call_raw(
        &self,
        to: Address,
        input: Bytes,
        at: BlockId,
    ) -> Result<Bytes, LaunchpadError> {
        self.pin(at);
        self.enter("eth_call", None).await?;
        self.ensure_factory("eth_call", to)?;
        if input.starts_with(&Factory::feeCall::SELECTOR) {
            let fee = *self.state.fee.read().unwrap();
            return Ok(Bytes::copy_from_slice(&fee.to_be_bytes::<32>()));
        }
        Err(LaunchpadError::read_call("eth_call", "unknown selector"))
    }

    async fn fee(&self, factory: Address, at: BlockId) -> Result<U256, LaunchpadError> {
        self.pin(at);
        self.enter("fee", None).await?;
        self.ensure_factory("fee", factory)?;
        Ok(*self.state.fee.read().unwrap())
    }

    async fn total_tokens(&self, factory: Address, at: BlockId) -> Result<U256, LaunchpadError> {
        self.pin(at);
        self.enter("totalTokens", None).await?;
        self.ensure_factory("totalTokens", factory)?;
        Ok(U256::from(self.state.sales.read().unwrap().len()))
    }

    async fn token_sale(
        &self,
        factory: Address,
        index: U256,
        at: BlockId,
    ) -> Result<SaleRecord, LaunchpadError> {
        self.pin(at);
        let index = SaleIndex::try_from(index)
            .map_err(|_| LaunchpadError::read_call("getTokenSale", "index overflow"))?;
        self.state.sale_indices.lock().unwrap().push(index);
        self.enter("getTokenSale", Some(index)).await?;
        self.ensure_factory("getTokenSale", factory)?;
        self.state
            .sales
            .read()
            .unwrap()
            .get(index as usize)
            .cloned()
            .ok_or_else(|| LaunchpadError::read_call("getTokenSale", "execution reverted"))
    }
}
