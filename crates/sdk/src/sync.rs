//! Listings synchronization.
//!
//! [`Synchronizer::sync`] recomputes the whole published state from chain:
//! network → deployment → code presence → fee → total → listings, and
//! publishes it with a single store write. Read and transport failures leave
//! previously published state intact; a chain without a usable deployment
//! publishes the empty state. Every outcome is recorded as a [`SyncEvent`].
//!
//! Every invocation is tagged with a monotonic sequence number, and results
//! of an invocation are discarded if a later one already published, so
//! overlapping refreshes settle on the most recent one.

use std::{
    collections::VecDeque,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use alloy::primitives::U256;
use futures::{Stream, stream};
use tokio::sync::watch;

use crate::{
    config::{DeploymentConfig, ImageTable, SyncSettings},
    error::{ErrorKind, LaunchpadError},
    factory::FactoryHandle,
    network,
    source::ChainSource,
    types::StateInstant,
    view::{self, Listings},
};

/// State published by the last successful synchronization.
///
/// Factory, fee and listings always originate from the same invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    seq: u64,
    factory: Option<FactoryHandle>,
    fee: U256,
    listings: Listings,
}

impl Snapshot {
    /// Sequence number of the invocation that published the state, 0 if
    /// nothing has been published yet.
    pub fn seq(&self) -> u64 { self.seq }

    /// Verified factory, absent until the first successful synchronization.
    pub fn factory(&self) -> Option<&FactoryHandle> { self.factory.as_ref() }

    pub fn chain_id(&self) -> Option<u64> { self.factory.map(|f| f.chain_id()) }

    /// Instant all published values were read at.
    pub fn instant(&self) -> Option<StateInstant> { self.factory.map(|f| f.instant()) }

    /// Listing fee in native currency units.
    pub fn fee(&self) -> U256 { self.fee }

    pub fn listings(&self) -> &Listings { &self.listings }
}

/// Severity of a [`SyncEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Published { fee: U256, listings: usize },
    Failed { kind: ErrorKind, message: String },
}

/// Diagnostic record of one synchronization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncEvent {
    seq: u64,
    outcome: SyncOutcome,
}

impl SyncEvent {
    fn failed(seq: u64, err: &LaunchpadError) -> Self {
        Self { seq, outcome: SyncOutcome::Failed { kind: err.kind(), message: err.to_string() } }
    }

    pub fn seq(&self) -> u64 { self.seq }

    pub fn outcome(&self) -> &SyncOutcome { &self.outcome }

    pub fn is_published(&self) -> bool { matches!(self.outcome, SyncOutcome::Published { .. }) }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.outcome {
            SyncOutcome::Published { .. } => None,
            SyncOutcome::Failed { kind, .. } => Some(*kind),
        }
    }

    pub fn severity(&self) -> Severity {
        match self.error_kind() {
            None => Severity::Info,
            Some(kind) if kind.is_unavailable() || kind == ErrorKind::Superseded => {
                Severity::Warning
            },
            Some(_) => Severity::Error,
        }
    }
}

impl std::fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            SyncOutcome::Published { fee, listings } => {
                write!(f, "sync #{}: published {} listings, fee {}", self.seq, listings, fee)
            },
            SyncOutcome::Failed { kind, message } => {
                write!(f, "sync #{} failed ({}): {}", self.seq, kind, message)
            },
        }
    }
}

/// Read-only view of the published state.
#[derive(Clone, Debug)]
pub struct StoreReader {
    rx: watch::Receiver<Snapshot>,
}

impl StoreReader {
    /// Currently published state.
    pub fn current(&self) -> Snapshot { self.rx.borrow().clone() }

    /// Waits for the next publish. Returns `None` once the synchronizer is
    /// dropped.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Single writer of the published [`Snapshot`].
pub struct Synchronizer<S> {
    source: S,
    config: DeploymentConfig,
    images: ImageTable,
    settings: SyncSettings,
    last_seq: AtomicU64,
    store: watch::Sender<Snapshot>,
    events: Mutex<VecDeque<SyncEvent>>,
}

impl<S: ChainSource> Synchronizer<S> {
    pub fn new(
        source: S,
        config: DeploymentConfig,
        images: ImageTable,
        settings: SyncSettings,
    ) -> Self {
        let (store, _) = watch::channel(Snapshot::default());
        Self {
            source,
            config,
            images,
            settings,
            last_seq: AtomicU64::new(0),
            store,
            events: Mutex::new(VecDeque::with_capacity(settings.event_history)),
        }
    }

    pub fn source(&self) -> &S { &self.source }

    pub fn settings(&self) -> SyncSettings { self.settings }

    /// Currently published state.
    pub fn snapshot(&self) -> Snapshot { self.store.borrow().clone() }

    pub fn subscribe(&self) -> StoreReader { StoreReader { rx: self.store.subscribe() } }

    /// Recent synchronization events, oldest first.
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Runs one synchronization and publishes its result unless a later
    /// invocation already did.
    ///
    /// Never fails: errors are logged and returned as a failed
    /// [`SyncEvent`]. Unless the chain turned out to have no deployment, the
    /// published state is left untouched.
    pub async fn sync(&self) -> SyncEvent {
        let seq = self.last_seq.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(seq, "synchronization started");

        let event = match self.fetch(seq).await.and_then(|snapshot| self.publish(snapshot)) {
            Ok(snapshot) => {
                tracing::info!(
                    seq,
                    chain_id = ?snapshot.chain_id(),
                    fee = %snapshot.fee,
                    listings = snapshot.listings.len(),
                    "synchronization published"
                );
                SyncEvent {
                    seq,
                    outcome: SyncOutcome::Published {
                        fee: snapshot.fee,
                        listings: snapshot.listings.len(),
                    },
                }
            },
            Err(err) => {
                if matches!(err.kind(), ErrorKind::UnsupportedNetwork | ErrorKind::ContractNotDeployed) {
                    self.unbind(seq);
                }
                let event = SyncEvent::failed(seq, &err);
                match event.severity() {
                    Severity::Error => {
                        tracing::error!(seq, kind = %err.kind(), error = %err, "synchronization failed")
                    },
                    _ => tracing::warn!(seq, kind = %err.kind(), error = %err, "synchronization halted"),
                }
                event
            },
        };

        self.record(event.clone());
        event
    }

    /// Stream of synchronizations: the first runs immediately, the following
    /// ones after `interval` each.
    pub fn refreshes<'a, Sl, SFut>(
        &'a self,
        interval: Duration,
        sleep: Sl,
    ) -> impl Stream<Item = SyncEvent> + 'a
    where
        Sl: Fn(Duration) -> SFut + Copy + 'a,
        SFut: Future<Output = ()> + 'a,
    {
        stream::unfold(false, move |started| async move {
            if started {
                sleep(interval).await;
            }
            Some((self.sync().await, true))
        })
    }

    async fn fetch(&self, seq: u64) -> Result<Snapshot, LaunchpadError> {
        let deployment = network::resolve_deployment(&self.source, &self.config).await?;
        let instant = self.source.latest_instant().await?;
        let factory = network::verify_deployment(&self.source, deployment, instant).await?;
        let reader = factory.reader(&self.source);

        match reader.probe_fee().await {
            Ok((raw, fee)) => tracing::debug!(seq, %raw, %fee, "raw fee probe"),
            Err(err) => tracing::warn!(seq, kind = %err.kind(), error = %err, "raw fee probe failed"),
        }

        let fee = reader.fee().await?;
        let total = reader.total_tokens().await?;
        tracing::debug!(seq, %fee, %total, block = instant.block_number(), "read factory state");

        let listings = view::build_listings(total, self.settings.max_listings, &self.images, |index| {
            reader.token_sale(index, total)
        })
        .await?;

        Ok(Snapshot { seq, factory: Some(factory), fee, listings })
    }

    fn publish(&self, snapshot: Snapshot) -> Result<Snapshot, LaunchpadError> {
        let mut latest = 0;
        let published = self.store.send_if_modified(|current| {
            latest = current.seq;
            if snapshot.seq > current.seq {
                *current = snapshot.clone();
                true
            } else {
                false
            }
        });
        if published {
            Ok(snapshot)
        } else {
            Err(LaunchpadError::Superseded { seq: snapshot.seq, latest })
        }
    }

    /// Publishes the empty state: the connected chain has no usable
    /// factory, so nothing read from another chain may stay visible.
    fn unbind(&self, seq: u64) {
        if self.publish(Snapshot { seq, ..Default::default() }).is_ok() {
            tracing::info!(seq, "factory unbound");
        }
    }

    fn record(&self, event: SyncEvent) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if self.settings.event_history == 0 {
            return;
        }
        while events.len() >= self.settings.event_history {
            events.pop_front();
        }
        events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, Bytes, address};

    use super::*;
    use crate::testing::{self, MockChain};

    const FACTORY: Address = address!("0x0000000000000000000000000000000000000fac");

    fn synchronizer(chain: &MockChain) -> Synchronizer<MockChain> {
        Synchronizer::new(
            chain.clone(),
            DeploymentConfig::new([(1, FACTORY)]),
            ImageTable::new((0..10).map(|i| format!("img{i}.png")).collect()),
            SyncSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_sync_publishes() {
        let chain = MockChain::new(1)
            .with_factory(FACTORY)
            .with_fee(U256::from(500))
            .with_sales((0..8).map(testing::sale).collect());
        let sync = synchronizer(&chain);

        let event = sync.sync().await;
        assert_eq!(event.outcome(), &SyncOutcome::Published { fee: U256::from(500), listings: 6 });
        assert_eq!(event.severity(), Severity::Info);

        let snapshot = sync.snapshot();
        assert_eq!(snapshot.seq(), 1);
        assert_eq!(snapshot.chain_id(), Some(1));
        assert_eq!(snapshot.factory().unwrap().address(), FACTORY);
        assert_eq!(snapshot.fee(), U256::from(500));
        assert_eq!(snapshot.listings().indices(), vec![7, 6, 5, 4, 3, 2]);
        assert_eq!(chain.sale_indices(), vec![2, 3, 4, 5, 6, 7]);
    }

    #[tokio::test]
    async fn test_publish_rejects_older_sequence() {
        let chain = MockChain::new(1).with_factory(FACTORY);
        let sync = synchronizer(&chain);
        assert!(sync.sync().await.is_published());

        let stale = Snapshot { seq: 1, ..Default::default() };
        let err = sync.publish(stale).unwrap_err();
        assert!(matches!(err, LaunchpadError::Superseded { seq: 1, latest: 1 }));
        assert!(sync.snapshot().factory().is_some());
    }

    #[tokio::test]
    async fn test_event_history_bounded() {
        let chain = MockChain::new(2);
        let sync = Synchronizer::new(
            chain,
            DeploymentConfig::new([(1, FACTORY)]),
            ImageTable::default(),
            SyncSettings { event_history: 2, ..Default::default() },
        );
        for _ in 0..3 {
            sync.sync().await;
        }
        let events = sync.events();
        assert_eq!(events.iter().map(SyncEvent::seq).collect::<Vec<_>>(), vec![2, 3]);
        assert!(events.iter().all(|e| e.error_kind() == Some(ErrorKind::UnsupportedNetwork)));
        assert_eq!(events[0].severity(), Severity::Warning);
    }

    #[tokio::test]
    async fn test_missing_deployment_unbinds_factory() {
        let chain = MockChain::new(1)
            .with_factory(FACTORY)
            .with_fee(U256::from(500))
            .with_sales(vec![testing::sale(0)]);
        let sync = synchronizer(&chain);
        assert!(sync.sync().await.is_published());

        chain.set_code(FACTORY, Bytes::new());
        let event = sync.sync().await;
        assert_eq!(event.error_kind(), Some(ErrorKind::ContractNotDeployed));

        let snapshot = sync.snapshot();
        assert_eq!(snapshot.seq(), 2);
        assert!(snapshot.factory().is_none());
        assert_eq!(snapshot.fee(), U256::ZERO);
        assert!(snapshot.listings().is_empty());
    }

    #[tokio::test]
    async fn test_subscriber_sees_publish() {
        let chain = MockChain::new(1)
            .with_factory(FACTORY)
            .with_sales(vec![testing::sale(0)]);
        let sync = synchronizer(&chain);
        let mut reader = sync.subscribe();
        assert_eq!(reader.current(), Snapshot::default());

        sync.sync().await;
        let snapshot = reader.changed().await.unwrap();
        assert_eq!(snapshot.listings().indices(), vec![0]);
        assert_eq!(reader.current(), sync.snapshot());
    }
}
