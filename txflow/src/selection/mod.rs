//! Selection State Machine
//!
//! Cascading network → token → method selection for a bridge session. The
//! transition function is pure: it takes the current selection and an event
//! and returns either `Unchanged` or a whole new selection. A failed
//! transition never touches the current selection.
//!
//! For bridge-in the user picks `from_network` and `to_network` is the hub.
//! For bridge-out `from_network` is the hub and the user picks `to_network`.

pub mod session;

use serde::Serialize;

use crate::catalog::{BridgeDirection, BridgingMethod, Catalog, Network, Token};
use crate::error::{FlowError, FlowResult};

pub use session::{BalanceRequest, BalanceUpdate, BridgeSession, BridgeSnapshot, SessionProps};

/// Setter events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    SetNetwork(String),
    SetToken(String),
    SetMethod(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The event selected what was already selected
    Unchanged,
    Changed(Selection),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub direction: BridgeDirection,
    pub testnet: bool,
    pub from_network: Option<Network>,
    pub to_network: Option<Network>,
    pub selected_token: Option<Token>,
    pub selected_method: Option<BridgingMethod>,
    /// Token list of the selectable network, in configuration order
    pub available_tokens: Vec<Token>,
    /// Methods of the selected token, in configuration order
    pub available_methods: Vec<BridgingMethod>,
}

impl Selection {
    /// Initial selection: the hub is fixed on its side, nothing else is picked.
    pub fn new(catalog: &Catalog, direction: BridgeDirection, testnet: bool) -> FlowResult<Self> {
        let hub = catalog.hub_network(testnet)?.clone();
        let (from_network, to_network) = match direction {
            BridgeDirection::In => (None, Some(hub)),
            BridgeDirection::Out => (Some(hub), None),
        };
        Ok(Self {
            direction,
            testnet,
            from_network,
            to_network,
            selected_token: None,
            selected_method: None,
            available_tokens: Vec::new(),
            available_methods: Vec::new(),
        })
    }

    /// The network the user picks (source for bridge-in, destination for bridge-out).
    pub fn selectable_network(&self) -> Option<&Network> {
        match self.direction {
            BridgeDirection::In => self.from_network.as_ref(),
            BridgeDirection::Out => self.to_network.as_ref(),
        }
    }

    /// The network the selected token is sent from.
    pub fn sending_network(&self) -> Option<&Network> {
        self.from_network.as_ref()
    }

    /// Networks that may be passed to `SetNetwork`.
    pub fn available_networks(&self, catalog: &Catalog) -> Vec<Network> {
        catalog.bridge_networks(self.testnet)
    }

    /// Applies a setter event.
    ///
    /// # Returns
    ///
    /// * `Ok(Transition::Unchanged)` - The id is already selected
    /// * `Ok(Transition::Changed(_))` - New selection with downstream levels reset
    /// * `Err(FlowError::NotFound)` - Unknown network, token or method
    /// * `Err(FlowError::InvalidState)` - Network without tokens, token without
    ///   methods, or a method the token does not support
    pub fn apply(&self, catalog: &Catalog, event: SelectionEvent) -> FlowResult<Transition> {
        match event {
            SelectionEvent::SetNetwork(id) => self.set_network(catalog, &id),
            SelectionEvent::SetToken(id) => self.set_token(&id),
            SelectionEvent::SetMethod(id) => self.set_method(&id),
        }
    }

    fn set_network(&self, catalog: &Catalog, id: &str) -> FlowResult<Transition> {
        if self.selectable_network().map(Network::id) == Some(id) {
            return Ok(Transition::Unchanged);
        }

        let network = self
            .available_networks(catalog)
            .into_iter()
            .find(|n| n.id() == id)
            .ok_or_else(|| FlowError::not_found("network", id))?;
        let tokens = catalog.tokens_for(self.direction, id);
        if tokens.is_empty() {
            return Err(FlowError::InvalidState(format!(
                "no tokens configured for network {}",
                id
            )));
        }

        let mut next = self.clone();
        match self.direction {
            BridgeDirection::In => next.from_network = Some(network),
            BridgeDirection::Out => next.to_network = Some(network),
        }
        next.available_tokens = tokens.to_vec();
        next.selected_token = None;
        next.available_methods = Vec::new();
        next.selected_method = None;
        Ok(Transition::Changed(next))
    }

    fn set_token(&self, id: &str) -> FlowResult<Transition> {
        if self.selected_token.as_ref().map(|t| t.id.as_str()) == Some(id) {
            return Ok(Transition::Unchanged);
        }

        let token = self
            .available_tokens
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| FlowError::not_found("token", id))?;
        if token.bridge_methods.is_empty() {
            return Err(FlowError::InvalidState(format!(
                "no bridging methods for token {}",
                id
            )));
        }

        let mut next = self.clone();
        next.available_methods = token.bridge_methods.clone();
        next.selected_token = Some(token.clone());
        next.selected_method = None;
        Ok(Transition::Changed(next))
    }

    fn set_method(&self, id: &str) -> FlowResult<Transition> {
        let method: BridgingMethod = id.parse()?;
        if self.selected_method == Some(method) {
            return Ok(Transition::Unchanged);
        }
        if !self.available_methods.contains(&method) {
            return Err(FlowError::InvalidState(format!(
                "{} is not available for the selected token",
                method
            )));
        }

        let mut next = self.clone();
        next.selected_method = Some(method);
        Ok(Transition::Changed(next))
    }
}
