//! First-in, first-out matching of a sale against purchase lots.
//!
//! Unlike the planning engines, every degenerate input here is a hard error:
//! a sale that cannot be fully matched must never produce a realised gain.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinPlanError;
use crate::precision::{checked_sum, percent_of, round2, round_to, safe_divide};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Quantity};
use crate::FinPlanResult;

/// An acquisition lot, oldest first in any list handed to [`match_fifo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub acquisition_date: NaiveDate,
    pub quantity: Quantity,
    pub unit_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FifoSaleInput {
    pub lots: Vec<Lot>,
    pub quantity_to_sell: Quantity,
    pub sale_price: Money,
    /// When given, each matched slice reports its holding period.
    #[serde(default)]
    pub sale_date: Option<NaiveDate>,
}

/// The part of one lot consumed by the sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSlice {
    pub lot_id: Option<String>,
    pub acquisition_date: NaiveDate,
    pub quantity: Quantity,
    pub unit_cost: Money,
    pub sale_price: Money,
    pub cost_basis: Money,
    pub sale_value: Money,
    pub gain: Money,
    pub gain_percent: Percent,
    pub holding_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FifoOutput {
    pub quantity_sold: Quantity,
    pub total_cost_basis: Money,
    pub total_sale_value: Money,
    pub realized_gain: Money,
    pub realized_gain_percent: Percent,
    pub average_cost: Money,
    pub batches: Vec<MatchedSlice>,
    /// Lots still held after the sale, oldest first.
    pub remaining_lots: Vec<Lot>,
    pub remaining_quantity: Quantity,
}

pub fn match_fifo(input: &FifoSaleInput) -> FinPlanResult<ComputationOutput<FifoOutput>> {
    let start = Instant::now();
    validate(input)?;

    let mut batches = Vec::new();
    let mut remaining_lots = Vec::new();
    let mut to_sell = input.quantity_to_sell;
    let mut cost_total = Decimal::ZERO;
    let mut sale_total = Decimal::ZERO;

    for lot in &input.lots {
        if to_sell <= Decimal::ZERO {
            remaining_lots.push(lot.clone());
            continue;
        }
        let take = to_sell.min(lot.quantity);
        let cost_basis = take
            .checked_mul(lot.unit_cost)
            .ok_or_else(|| FinPlanError::out_of_range("lots"))?;
        let sale_value = take
            .checked_mul(input.sale_price)
            .ok_or_else(|| FinPlanError::out_of_range("sale_price"))?;
        let gain = sale_value
            .checked_sub(cost_basis)
            .ok_or_else(|| FinPlanError::out_of_range("lots"))?;
        batches.push(MatchedSlice {
            lot_id: lot.id.clone(),
            acquisition_date: lot.acquisition_date,
            quantity: take,
            unit_cost: lot.unit_cost,
            sale_price: input.sale_price,
            cost_basis: round2(cost_basis),
            sale_value: round2(sale_value),
            gain: round2(gain),
            gain_percent: gain_percent(gain, cost_basis),
            holding_days: input
                .sale_date
                .map(|sold| (sold - lot.acquisition_date).num_days()),
        });
        cost_total = cost_total
            .checked_add(cost_basis)
            .ok_or_else(|| FinPlanError::out_of_range("lots"))?;
        sale_total = sale_total
            .checked_add(sale_value)
            .ok_or_else(|| FinPlanError::out_of_range("sale_price"))?;
        to_sell -= take;

        if take < lot.quantity {
            remaining_lots.push(Lot {
                quantity: lot.quantity - take,
                ..lot.clone()
            });
        }
    }

    if to_sell > Decimal::ZERO {
        let matched = input.quantity_to_sell - to_sell;
        tracing::warn!(
            requested = %input.quantity_to_sell,
            matched = %matched,
            "sale exceeds purchase history"
        );
        return Err(FinPlanError::InsufficientHistory {
            requested: input.quantity_to_sell,
            matched,
            unmatched: to_sell,
        });
    }

    let realized = sale_total
        .checked_sub(cost_total)
        .ok_or_else(|| FinPlanError::out_of_range("lots"))?;
    let remaining_quantity: Quantity = checked_sum(remaining_lots.iter().map(|l| l.quantity))
        .ok_or_else(|| FinPlanError::out_of_range("lots"))?;
    tracing::debug!(
        slices = batches.len(),
        gain = %realized,
        "FIFO sale matched"
    );

    let output = FifoOutput {
        quantity_sold: input.quantity_to_sell,
        total_cost_basis: round2(cost_total),
        total_sale_value: round2(sale_total),
        realized_gain: round2(realized),
        realized_gain_percent: gain_percent(realized, cost_total),
        average_cost: round_to(safe_divide(cost_total, input.quantity_to_sell), 4),
        batches,
        remaining_lots,
        remaining_quantity,
    };

    let assumptions = serde_json::json!({
        "lots": input.lots.len(),
        "quantity_to_sell": input.quantity_to_sell.to_string(),
        "sale_price": input.sale_price.to_string(),
    });
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "FIFO lot matching",
        &assumptions,
        Vec::new(),
        elapsed,
        output,
    ))
}

fn validate(input: &FifoSaleInput) -> FinPlanResult<()> {
    if input.lots.is_empty() {
        return Err(FinPlanError::InsufficientHistory {
            requested: input.quantity_to_sell,
            matched: Decimal::ZERO,
            unmatched: input.quantity_to_sell,
        });
    }
    if input.quantity_to_sell <= Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: "quantity_to_sell".into(),
            reason: "must be greater than zero".into(),
        });
    }
    if input.sale_price < Decimal::ZERO {
        return Err(FinPlanError::InvalidInput {
            field: "sale_price".into(),
            reason: "must not be negative".into(),
        });
    }
    for (i, lot) in input.lots.iter().enumerate() {
        if lot.quantity <= Decimal::ZERO {
            return Err(FinPlanError::InvalidInput {
                field: format!("lots[{i}].quantity"),
                reason: "must be greater than zero".into(),
            });
        }
        if lot.unit_cost < Decimal::ZERO {
            return Err(FinPlanError::InvalidInput {
                field: format!("lots[{i}].unit_cost"),
                reason: "must not be negative".into(),
            });
        }
    }
    if let Some(i) = input
        .lots
        .windows(2)
        .position(|pair| pair[1].acquisition_date < pair[0].acquisition_date)
    {
        return Err(FinPlanError::InvalidInput {
            field: format!("lots[{}].acquisition_date", i + 1),
            reason: "lots must be ordered oldest first".into(),
        });
    }
    Ok(())
}

/// Gain over cost in percent, 2 dp; zero on a zero cost basis.
fn gain_percent(gain: Money, cost_basis: Money) -> Percent {
    if cost_basis <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round2(percent_of(gain, cost_basis))
}
