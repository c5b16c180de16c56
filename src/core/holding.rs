use crate::core::AssetClass;
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A position owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: Uuid,
    pub owner: String,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub quantity: f64,
    pub buy_price: f64,
    pub created_at: DateTime<Utc>,
}

impl Holding {
    /// Capital put into the position at its recorded buy price.
    pub fn invested(&self) -> f64 {
        self.buy_price * self.quantity
    }
}

/// Unvalidated input for a new holding.
#[derive(Debug, Clone)]
pub struct NewHolding {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub quantity: f64,
    pub buy_price: f64,
}

impl NewHolding {
    pub fn validate(&self) -> Result<()> {
        validate_symbol(&self.symbol)?;
        validate_amount("quantity", self.quantity)?;
        validate_amount("buy price", self.buy_price)
    }

    pub fn into_holding(self, owner: &str) -> Result<Holding> {
        self.validate()?;
        Ok(Holding {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            symbol: normalize_symbol(&self.symbol),
            asset_class: self.asset_class,
            quantity: self.quantity,
            buy_price: self.buy_price,
            created_at: Utc::now(),
        })
    }
}

/// Replacement fields for an existing holding. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct HoldingPatch {
    pub symbol: Option<String>,
    pub asset_class: Option<AssetClass>,
    pub quantity: Option<f64>,
    pub buy_price: Option<f64>,
}

impl HoldingPatch {
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none()
            && self.asset_class.is_none()
            && self.quantity.is_none()
            && self.buy_price.is_none()
    }

    /// Validates every field first so a bad patch leaves the holding untouched.
    pub fn apply(&self, holding: &mut Holding) -> Result<()> {
        if let Some(symbol) = &self.symbol {
            validate_symbol(symbol)?;
        }
        if let Some(quantity) = self.quantity {
            validate_amount("quantity", quantity)?;
        }
        if let Some(buy_price) = self.buy_price {
            validate_amount("buy price", buy_price)?;
        }

        if let Some(symbol) = &self.symbol {
            holding.symbol = normalize_symbol(symbol);
        }
        if let Some(asset_class) = self.asset_class {
            holding.asset_class = asset_class;
        }
        if let Some(quantity) = self.quantity {
            holding.quantity = quantity;
        }
        if let Some(buy_price) = self.buy_price {
            holding.buy_price = buy_price;
        }
        Ok(())
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.trim().is_empty() {
        bail!("Symbol must not be empty");
    }
    Ok(())
}

fn validate_amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!("Invalid {field}: {value} (must be a non-negative number)");
    }
    Ok(())
}
