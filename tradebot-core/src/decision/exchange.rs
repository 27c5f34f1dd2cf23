//! Order execution seam.
//!
//! The decision loop talks to an [`ExchangeClient`] so execution can be
//! swapped without touching the engine. The paper implementation fills
//! instantly at the requested price and keeps a fill log for inspection;
//! the live implementation rejects every order until API credentials are
//! wired in, so turning paper mode off can never silently simulate fills.

use crate::domain::TradeAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("order rejected: {0}")]
    Rejected(String),
    #[error("exchange unreachable: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: f64,
    /// Limit price; the paper exchange fills exactly here.
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: f64,
    pub fill_price: f64,
    pub simulated: bool,
    pub timestamp: DateTime<Utc>,
}

pub trait ExchangeClient: Send + Sync {
    fn name(&self) -> &'static str;
    fn place_order(&self, request: &OrderRequest) -> Result<OrderReceipt, ExchangeError>;
}

/// Simulated exchange: every well-formed order fills at its requested price.
#[derive(Debug, Default)]
pub struct PaperExchange {
    next_order: AtomicU64,
    fills: Mutex<Vec<OrderReceipt>>,
}

impl PaperExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// All fills placed through this instance, oldest first.
    pub fn fills(&self) -> Vec<OrderReceipt> {
        self.fills
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ExchangeClient for PaperExchange {
    fn name(&self) -> &'static str {
        "paper"
    }

    fn place_order(&self, request: &OrderRequest) -> Result<OrderReceipt, ExchangeError> {
        if !(request.quantity > 0.0) || !request.quantity.is_finite() {
            return Err(ExchangeError::Rejected(format!(
                "quantity {} is not a positive number",
                request.quantity
            )));
        }
        if !(request.price > 0.0) || !request.price.is_finite() {
            return Err(ExchangeError::Rejected(format!(
                "price {} is not a positive number",
                request.price
            )));
        }

        let seq = self.next_order.fetch_add(1, Ordering::Relaxed);
        let receipt = OrderReceipt {
            order_id: format!("paper_{seq}"),
            symbol: request.symbol.clone(),
            action: request.action,
            quantity: request.quantity,
            fill_price: request.price,
            simulated: true,
            timestamp: Utc::now(),
        };
        info!(
            order_id = %receipt.order_id,
            symbol = %receipt.symbol,
            action = ?receipt.action,
            quantity = receipt.quantity,
            fill_price = receipt.fill_price,
            "paper fill"
        );
        self.fills
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(receipt.clone());
        Ok(receipt)
    }
}

/// Live trading stub. No credential handling exists yet, so every order is
/// rejected loudly instead of being simulated behind the caller's back.
#[derive(Debug, Default)]
pub struct LiveExchange;

impl LiveExchange {
    pub fn new() -> Self {
        Self
    }
}

impl ExchangeClient for LiveExchange {
    fn name(&self) -> &'static str {
        "live"
    }

    fn place_order(&self, request: &OrderRequest) -> Result<OrderReceipt, ExchangeError> {
        warn!(
            symbol = %request.symbol,
            action = ?request.action,
            "live order refused: no API credentials configured"
        );
        Err(ExchangeError::Rejected(
            "no API credentials configured".into(),
        ))
    }
}
