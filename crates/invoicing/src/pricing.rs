//! Tiered usage pricing.
//!
//! Turns one representative's tier volumes into invoice line items: one line
//! per tier with usage, an optional discount line and an optional fee line
//! (both before tax), then a tax line on the adjusted running total.
//!
//! Rounding policy: every line amount is rounded to the nearest whole currency
//! unit before it is accumulated, and the final total is the exact sum of the
//! rounded lines, never independently rounded. This keeps the invariant
//! `invoice.total_amount == Σ item.total` exact.

use serde::{Deserialize, Serialize};

use panelbill_core::{DomainError, DomainResult, PriceTable, TierVolumes};

/// One priced line, not yet bound to an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    /// Signed: negative for discount lines.
    pub unit_price: i64,
    pub total: i64,
}

/// The result of pricing one canonical usage record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedUsage {
    pub items: Vec<LineItem>,
    /// Exact sum of `items[..].total`.
    pub total: i64,
}

impl PricedUsage {
    /// Whether this pricing produced anything worth invoicing. An all-zero
    /// usage record with no discount/fee yields no items and is skipped by the
    /// caller rather than treated as an error.
    pub fn is_billable(&self) -> bool {
        !self.items.is_empty()
    }
}

/// Deterministic price-volume calculator. Pure function of its inputs.
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    tax_rate: f64,
}

impl PricingCalculator {
    pub fn new(tax_rate: f64) -> DomainResult<Self> {
        if !tax_rate.is_finite() || tax_rate < 0.0 {
            return Err(DomainError::validation(format!(
                "tax rate must be a non-negative fraction, got {tax_rate}"
            )));
        }
        Ok(Self { tax_rate })
    }

    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    /// Price one usage record against a price table.
    ///
    /// The metered/unlimited tier split only affects line descriptions; the
    /// arithmetic is identical for both groups.
    pub fn price(
        &self,
        usage: &TierVolumes,
        discount_amount: f64,
        additional_fee: f64,
        prices: &PriceTable,
    ) -> DomainResult<PricedUsage> {
        let mut items: Vec<LineItem> = Vec::new();
        let mut running: i64 = 0;

        for (tier, volume) in usage.iter() {
            if volume <= 0.0 {
                continue;
            }
            let unit_price = prices.get(tier);
            let line_total = round_currency(volume * unit_price as f64)?;
            running = running
                .checked_add(line_total)
                .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
            items.push(LineItem {
                description: format!("{} - {} units", tier.label(), format_quantity(volume)),
                quantity: volume,
                unit_price,
                total: line_total,
            });
        }

        if discount_amount > 0.0 {
            let amount = round_currency(discount_amount)?;
            running = running
                .checked_sub(amount)
                .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
            items.push(LineItem {
                description: "Discount".to_string(),
                quantity: 1.0,
                unit_price: -amount,
                total: -amount,
            });
        }

        if additional_fee > 0.0 {
            let amount = round_currency(additional_fee)?;
            running = running
                .checked_add(amount)
                .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
            items.push(LineItem {
                description: "Additional fee".to_string(),
                quantity: 1.0,
                unit_price: amount,
                total: amount,
            });
        }

        if items.is_empty() {
            // Degenerate case: nothing to bill. The caller skips invoice
            // creation for this record.
            return Ok(PricedUsage { items, total: 0 });
        }

        let tax = round_currency(running as f64 * self.tax_rate)?;
        if tax > 0 {
            running = running
                .checked_add(tax)
                .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
            items.push(LineItem {
                description: format!("Tax ({}%)", self.tax_rate * 100.0),
                quantity: 1.0,
                unit_price: tax,
                total: tax,
            });
        }

        Ok(PricedUsage {
            items,
            total: running,
        })
    }
}

/// Round to the nearest whole currency unit, rejecting values that do not fit.
fn round_currency(amount: f64) -> DomainResult<i64> {
    if !amount.is_finite() {
        return Err(DomainError::invariant("line amount is not finite"));
    }
    let rounded = amount.round();
    if rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
        return Err(DomainError::invariant("line amount overflow"));
    }
    Ok(rounded as i64)
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}")
    }
}
