//! Page-level state around the synchronized listings: connected account,
//! create/trade panel visibility and the token selected for trading.
//!
//! Every visibility transition requests a refresh, so listings reflect state
//! changed by whatever the closed panel submitted.

use alloy::primitives::{Address, U256};

use crate::{
    source::ChainSource,
    sync::{Snapshot, SyncEvent, Synchronizer},
    types::TokenView,
};

/// Label of the create button when no factory is available.
pub const CONTRACT_NOT_DEPLOYED: &str = "[ contract not deployed ]";
/// Label of the create button when no account is connected.
pub const PLEASE_CONNECT: &str = "[ please connect ]";
pub const START_NEW_TOKEN: &str = "[ start a new token ]";
pub const CONNECT_WALLET: &str = "please connect wallet";
pub const NO_TOKENS_LISTED: &str = "No tokens listed";

/// Request to re-run synchronization.
#[must_use = "refresh has to be run against the synchronizer"]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Refresh;

impl Refresh {
    pub async fn run<S: ChainSource>(self, sync: &Synchronizer<S>) -> SyncEvent { sync.sync().await }
}

/// What the listings area shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingsStatus<'a> {
    ConnectWallet,
    Empty,
    Tokens(&'a [TokenView]),
}

impl std::fmt::Display for ListingsStatus<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingsStatus::ConnectWallet => f.write_str(CONNECT_WALLET),
            ListingsStatus::Empty => f.write_str(NO_TOKENS_LISTED),
            ListingsStatus::Tokens(tokens) => write!(f, "{} listings", tokens.len()),
        }
    }
}

/// Panel opened on top of the listings, with the state it consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Panel<'a> {
    Create { factory: Address, fee: U256 },
    Trade { factory: Option<Address>, token: Option<&'a TokenView> },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    account: Option<Address>,
    show_create: bool,
    show_trade: bool,
    selected: Option<TokenView>,
}

impl Page {
    /// Fresh page, together with the refresh run on mount.
    pub fn mount() -> (Self, Refresh) { (Self::default(), Refresh) }

    pub fn account(&self) -> Option<Address> { self.account }

    pub fn connect(&mut self, account: Address) { self.account = Some(account); }

    pub fn disconnect(&mut self) { self.account = None; }

    pub fn show_create(&self) -> bool { self.show_create }

    pub fn show_trade(&self) -> bool { self.show_trade }

    /// Token the trade panel was last toggled with.
    pub fn selected(&self) -> Option<&TokenView> { self.selected.as_ref() }

    /// Whether the create button opens the panel: requires both a factory
    /// and a connected account.
    pub fn can_create(&self, state: &Snapshot) -> bool {
        state.factory().is_some() && self.account.is_some()
    }

    /// Flips create panel visibility. Opening is ignored unless
    /// [`Self::can_create`], closing is always allowed.
    pub fn toggle_create(&mut self, state: &Snapshot) -> Option<Refresh> {
        if !self.show_create && !self.can_create(state) {
            return None;
        }
        self.show_create = !self.show_create;
        Some(Refresh)
    }

    /// Flips trade panel visibility, remembering the token it was toggled
    /// with.
    pub fn toggle_trade(&mut self, token: Option<TokenView>) -> Refresh {
        self.selected = token;
        self.show_trade = !self.show_trade;
        Refresh
    }

    pub fn create_label(&self, state: &Snapshot) -> &'static str {
        if state.factory().is_none() {
            CONTRACT_NOT_DEPLOYED
        } else if self.account.is_none() {
            PLEASE_CONNECT
        } else {
            START_NEW_TOKEN
        }
    }

    pub fn listings<'a>(&self, state: &'a Snapshot) -> ListingsStatus<'a> {
        if self.account.is_none() {
            ListingsStatus::ConnectWallet
        } else if state.listings().is_empty() {
            ListingsStatus::Empty
        } else {
            ListingsStatus::Tokens(state.listings().as_slice())
        }
    }

    /// Panels currently open, create first.
    pub fn panels<'a>(&'a self, state: &Snapshot) -> Vec<Panel<'a>> {
        let factory = state.factory().map(|f| f.address());
        let mut panels = Vec::with_capacity(2);
        if self.show_create
            && let Some(factory) = factory
        {
            panels.push(Panel::Create { factory, fee: state.fee() });
        }
        if self.show_trade {
            panels.push(Panel::Trade { factory, token: self.selected.as_ref() });
        }
        panels
    }
}
