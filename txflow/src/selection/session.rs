//! Bridge session adapter
//!
//! Holds the current selection behind an `Arc` and replaces it on every
//! transition. Balances for the visible token list are fetched out of band:
//! a network change hands out a `BalanceRequest` tagged with the current
//! generation, and results from an older generation are dropped.

use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Selection, SelectionEvent, Transition};
use crate::bridge::BridgeDispatcher;
use crate::catalog::{BridgeDirection, BridgingMethod, Catalog, Network, Token, TokenWithBalance};
use crate::chains::{Accounts, BalanceService};
use crate::error::{FlowError, FlowResult};
use crate::transaction::Transaction;

/// Session inputs supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionProps {
    pub testnet: bool,
    pub user_eth_address: Option<String>,
    pub user_cosmos_address: Option<String>,
    /// Network `auto_select` tries before the first usable one
    pub default_network_id: Option<String>,
}

/// Balances to fetch for one token list
#[derive(Debug, Clone)]
pub struct BalanceRequest {
    pub generation: u64,
    pub network: Network,
    pub tokens: Vec<Token>,
    pub accounts: Accounts,
}

/// Lookup results for a `BalanceRequest`, one per token
#[derive(Debug)]
pub struct BalanceUpdate {
    pub generation: u64,
    pub results: Vec<(String, FlowResult<String>)>,
}

/// Everything a caller needs to render the session
#[derive(Debug, Clone, Serialize)]
pub struct BridgeSnapshot {
    pub direction: BridgeDirection,
    pub networks: Vec<Network>,
    pub from_network: Option<Network>,
    pub to_network: Option<Network>,
    pub tokens: Vec<TokenWithBalance>,
    pub selected_token: Option<TokenWithBalance>,
    pub methods: Vec<BridgingMethod>,
    pub selected_method: Option<BridgingMethod>,
}

pub struct BridgeSession {
    catalog: Arc<Catalog>,
    props: SessionProps,
    selection: Arc<Selection>,
    generation: u64,
    balances: HashMap<String, String>,
    balance_service: Arc<dyn BalanceService>,
    dispatcher: Arc<BridgeDispatcher>,
}

impl BridgeSession {
    pub fn new(
        catalog: Arc<Catalog>,
        direction: BridgeDirection,
        props: SessionProps,
        balance_service: Arc<dyn BalanceService>,
        dispatcher: Arc<BridgeDispatcher>,
    ) -> FlowResult<Self> {
        let selection = Selection::new(&catalog, direction, props.testnet)?;
        Ok(Self {
            catalog,
            props,
            selection: Arc::new(selection),
            generation: 0,
            balances: HashMap::new(),
            balance_service,
            dispatcher,
        })
    }

    /// Current selection; cheap to clone and never mutated in place.
    pub fn selection(&self) -> Arc<Selection> {
        Arc::clone(&self.selection)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn apply(&mut self, event: SelectionEvent) -> FlowResult<bool> {
        match self.selection.apply(&self.catalog, event.clone())? {
            Transition::Unchanged => {
                debug!("Selection unchanged by {:?}", event);
                Ok(false)
            }
            Transition::Changed(next) => {
                info!("Selection updated by {:?}", event);
                self.selection = Arc::new(next);
                Ok(true)
            }
        }
    }

    fn balance_request(&self) -> Option<BalanceRequest> {
        let network = self.selection.sending_network()?.clone();
        Some(BalanceRequest {
            generation: self.generation,
            network,
            tokens: self.selection.available_tokens.clone(),
            accounts: Accounts {
                eth_address: self.props.user_eth_address.clone(),
                cosmos_address: self.props.user_cosmos_address.clone(),
            },
        })
    }

    /// Selects the source (bridge-in) or destination (bridge-out) network.
    ///
    /// Returns a balance request for the new token list, or `None` when the
    /// network was already selected.
    pub fn set_network(&mut self, id: &str) -> FlowResult<Option<BalanceRequest>> {
        if !self.apply(SelectionEvent::SetNetwork(id.to_string()))? {
            return Ok(None);
        }
        self.generation += 1;
        self.balances.clear();
        Ok(self.balance_request())
    }

    pub fn set_token(&mut self, id: &str) -> FlowResult<()> {
        self.apply(SelectionEvent::SetToken(id.to_string()))?;
        Ok(())
    }

    pub fn set_method(&mut self, id: &str) -> FlowResult<()> {
        self.apply(SelectionEvent::SetMethod(id.to_string()))?;
        Ok(())
    }

    /// Fills every unset level with its first available option.
    ///
    /// The default network from the props is preferred when it is available
    /// and has tokens. Networks without tokens and tokens without methods are
    /// skipped.
    pub fn auto_select(&mut self) -> FlowResult<Option<BalanceRequest>> {
        let mut request = None;

        if self.selection.selectable_network().is_none() {
            let direction = self.selection.direction;
            let usable: Vec<Network> = self
                .selection
                .available_networks(&self.catalog)
                .into_iter()
                .filter(|n| !self.catalog.tokens_for(direction, n.id()).is_empty())
                .collect();
            let preferred = self
                .props
                .default_network_id
                .as_deref()
                .and_then(|id| {
                    let found = usable.iter().find(|n| n.id() == id);
                    if found.is_none() {
                        debug!("Default network {} is not usable, falling back", id);
                    }
                    found
                });
            if let Some(network) = preferred.or_else(|| usable.first()) {
                request = self.set_network(network.id())?;
            }
        }

        if self.selection.selected_token.is_none() {
            let candidate = self
                .selection
                .available_tokens
                .iter()
                .find(|t| !t.bridge_methods.is_empty())
                .map(|t| t.id.clone());
            if let Some(token_id) = candidate {
                self.set_token(&token_id)?;
            }
        }

        if self.selection.selected_method.is_none() {
            if let Some(method) = self.selection.available_methods.first().copied() {
                self.set_method(method.as_str())?;
            }
        }

        Ok(request)
    }

    /// Runs the lookups of a balance request concurrently.
    ///
    /// A failed lookup is recorded for its token only.
    pub async fn fetch_balances(&self, request: BalanceRequest) -> BalanceUpdate {
        fetch_balances(self.balance_service.as_ref(), request).await
    }

    /// Stores balances unless the token list has changed since the request.
    ///
    /// Returns `false` when the update was stale and discarded.
    pub fn apply_balances(&mut self, update: BalanceUpdate) -> bool {
        if update.generation != self.generation {
            debug!(
                "Discarding balances from generation {} (current {})",
                update.generation, self.generation
            );
            return false;
        }
        for (token_id, result) in update.results {
            match result {
                Ok(balance) => {
                    self.balances.insert(token_id, balance);
                }
                Err(e) => warn!("Balance lookup for {} failed: {}", token_id, e),
            }
        }
        true
    }

    /// Fetches and applies balances for the current token list.
    pub async fn refresh_balances(&mut self) -> bool {
        let Some(request) = self.balance_request() else {
            return false;
        };
        let update = self.fetch_balances(request).await;
        self.apply_balances(update)
    }

    fn with_balance(&self, token: &Token) -> TokenWithBalance {
        TokenWithBalance {
            token: token.clone(),
            balance: self.balances.get(&token.id).cloned(),
        }
    }

    pub fn snapshot(&self) -> BridgeSnapshot {
        let selection = &self.selection;
        BridgeSnapshot {
            direction: selection.direction,
            networks: selection.available_networks(&self.catalog),
            from_network: selection.from_network.clone(),
            to_network: selection.to_network.clone(),
            tokens: selection
                .available_tokens
                .iter()
                .map(|t| self.with_balance(t))
                .collect(),
            selected_token: selection.selected_token.as_ref().map(|t| self.with_balance(t)),
            methods: selection.available_methods.clone(),
            selected_method: selection.selected_method,
        }
    }

    /// Builds the transactions for the current selection.
    pub async fn bridge(&self, eth_account: &str, amount: &str) -> FlowResult<Vec<Transaction>> {
        if eth_account.is_empty() {
            return Err(FlowError::InvalidState("no EVM account connected".to_string()));
        }
        let cosmos = self.props.user_cosmos_address.as_deref();
        match self.selection.direction {
            BridgeDirection::In => {
                self.dispatcher
                    .bridge_in(&self.selection, eth_account, cosmos, amount)
                    .await
            }
            BridgeDirection::Out => {
                self.dispatcher
                    .bridge_out(&self.selection, eth_account, cosmos, amount)
                    .await
            }
        }
    }
}

/// Runs all balance lookups of `request` concurrently and joins them.
pub async fn fetch_balances(service: &dyn BalanceService, request: BalanceRequest) -> BalanceUpdate {
    let network = &request.network;
    let accounts = &request.accounts;
    let lookups = request.tokens.iter().map(|token| async move {
        let result = service
            .balance(network, token, accounts)
            .await
            .map_err(|e| FlowError::upstream("balance", e));
        (token.id.clone(), result)
    });
    let results = join_all(lookups).await;
    BalanceUpdate {
        generation: request.generation,
        results,
    }
}
