use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::guard::{out_of_range, Guard};
use crate::precision::{checked_sum, percent_of, round2};
use crate::types::{with_metadata, ChartPoint, ComputationOutput, Money, Percent};

const METHODOLOGY: &str = "Asset Allocation Rebalancing (target weights, fixed trade threshold)";

/// Adjustments within this amount either way are left alone.
const TRADE_THRESHOLD: Money = dec!(100);
/// A portfolio is balanced when every drift is below this many percentage points.
const BALANCE_TOLERANCE: Percent = dec!(1);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub asset: String,
    pub current_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetWeight {
    pub asset: String,
    pub target_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationInput {
    pub holdings: Vec<Holding>,
    pub targets: Vec<TargetWeight>,
    /// New money to deploy alongside the existing holdings.
    #[serde(default)]
    pub fresh_investment: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RebalanceAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPosition {
    pub asset: String,
    pub current_value: Money,
    pub current_percent: Percent,
    pub target_percent: Percent,
    /// Current minus target, in percentage points.
    pub drift: Percent,
    pub target_value: Money,
    pub adjustment: Money,
    pub action: RebalanceAction,
    pub action_amount: Money,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationOutput {
    pub total_value: Money,
    pub positions: Vec<AssetPosition>,
    pub total_buy: Money,
    pub total_sell: Money,
    pub is_balanced: bool,
    pub allocation_chart: Vec<ChartPoint>,
}

/// Compare holdings with their target weights and size the trades that close
/// the gap. Assets without a holding count as zero; holdings without a
/// target are ignored.
pub fn rebalance(input: &AllocationInput) -> ComputationOutput<AllocationOutput> {
    let start = Instant::now();
    let assumptions = serde_json::json!({
        "holdings": input.holdings.len(),
        "targets": input.targets.len(),
        "fresh_investment": input.fresh_investment.map(|v| v.to_string()),
        "trade_threshold": TRADE_THRESHOLD.to_string(),
    });

    let target_sum = checked_sum(input.targets.iter().map(|t| t.target_percent));
    let total = checked_sum(
        input
            .holdings
            .iter()
            .map(|h| h.current_value)
            .chain(input.fresh_investment),
    );
    let guard = Guard::new()
        .require(!input.holdings.is_empty(), "holdings", "at least one holding is required")
        .require(!input.targets.is_empty(), "targets", "at least one target is required")
        .in_range(target_sum.as_ref(), "targets")
        .in_range(total.as_ref(), "total_value");
    if let Some(empty) = guard.reject(METHODOLOGY, &assumptions, start) {
        return empty;
    }
    let target_sum = target_sum.unwrap_or_default();
    let total = total.unwrap_or_default();

    let mut warnings = Vec::new();
    if target_sum != dec!(100) {
        warnings.push(format!("target weights sum to {target_sum}%, not 100%"));
    }

    match allocate(input, total) {
        Some(output) => {
            let elapsed = start.elapsed().as_micros() as u64;
            with_metadata(METHODOLOGY, &assumptions, warnings, elapsed, output)
        }
        None => out_of_range("positions", METHODOLOGY, &assumptions, start),
    }
}

fn allocate(input: &AllocationInput, total: Money) -> Option<AllocationOutput> {
    let positions = input
        .targets
        .iter()
        .map(|target| position(input, target, total))
        .collect::<Option<Vec<AssetPosition>>>()?;

    let total_for = |wanted: RebalanceAction| {
        checked_sum(
            positions
                .iter()
                .filter(|p| p.action == wanted)
                .map(|p| p.action_amount),
        )
    };
    let total_buy = total_for(RebalanceAction::Buy)?;
    let total_sell = total_for(RebalanceAction::Sell)?;
    let is_balanced = positions.iter().all(|p| p.drift.abs() < BALANCE_TOLERANCE);
    let allocation_chart = positions
        .iter()
        .map(|p| ChartPoint::new(p.asset.clone(), p.current_percent))
        .collect();

    tracing::debug!(
        assets = positions.len(),
        buy = %total_buy,
        sell = %total_sell,
        is_balanced,
        "rebalancing computed"
    );

    Some(AllocationOutput {
        total_value: round2(total),
        positions,
        total_buy,
        total_sell,
        is_balanced,
        allocation_chart,
    })
}

fn position(input: &AllocationInput, target: &TargetWeight, total: Money) -> Option<AssetPosition> {
    let current_value = input
        .holdings
        .iter()
        .find(|h| h.asset == target.asset)
        .map(|h| h.current_value)
        .unwrap_or(Decimal::ZERO);
    let current_percent = percent_of(current_value, total);
    let target_value = round2(total.checked_mul(target.target_percent)?.checked_div(dec!(100))?);
    let adjustment = target_value.checked_sub(current_value)?;
    let (action, action_amount, recommendation) = if adjustment > TRADE_THRESHOLD {
        let amount = round2(adjustment);
        (
            RebalanceAction::Buy,
            amount,
            format!("Invest {amount} more in {}", target.asset),
        )
    } else if adjustment < -TRADE_THRESHOLD {
        let amount = round2(adjustment.abs());
        (
            RebalanceAction::Sell,
            amount,
            format!("Redeem {amount} from {}", target.asset),
        )
    } else {
        (
            RebalanceAction::Hold,
            Decimal::ZERO,
            format!("{} is balanced", target.asset),
        )
    };
    Some(AssetPosition {
        asset: target.asset.clone(),
        current_value: round2(current_value),
        current_percent: round2(current_percent),
        target_percent: target.target_percent,
        drift: round2(current_percent.checked_sub(target.target_percent)?),
        target_value,
        adjustment: round2(adjustment),
        action,
        action_amount,
        recommendation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(asset: &str, value: Decimal) -> Holding {
        Holding {
            asset: asset.into(),
            current_value: value,
        }
    }

    fn target(asset: &str, pct: Decimal) -> TargetWeight {
        TargetWeight {
            asset: asset.into(),
            target_percent: pct,
        }
    }

    fn sixty_forty() -> AllocationInput {
        AllocationInput {
            holdings: vec![holding("equity", dec!(700_000)), holding("debt", dec!(300_000))],
            targets: vec![target("equity", dec!(60)), target("debt", dec!(40))],
            fresh_investment: None,
        }
    }

    #[test]
    fn test_overweight_equity_is_sold() {
        let out = rebalance(&sixty_forty()).result;
        assert_eq!(out.total_value, dec!(1_000_000));
        let equity = &out.positions[0];
        assert_eq!(equity.current_percent, dec!(70));
        assert_eq!(equity.drift, dec!(10));
        assert_eq!(equity.action, RebalanceAction::Sell);
        assert_eq!(equity.action_amount, dec!(100_000));
        let debt = &out.positions[1];
        assert_eq!(debt.action, RebalanceAction::Buy);
        assert_eq!(debt.action_amount, dec!(100_000));
        assert_eq!(out.total_buy, dec!(100_000));
        assert_eq!(out.total_sell, dec!(100_000));
        assert!(!out.is_balanced);
    }

    #[test]
    fn test_fresh_investment_is_deployed() {
        let mut input = sixty_forty();
        input.fresh_investment = Some(dec!(500_000));
        let out = rebalance(&input).result;
        assert_eq!(out.total_value, dec!(1_500_000));
        assert_eq!(out.positions[0].action, RebalanceAction::Buy);
        assert_eq!(out.positions[0].action_amount, dec!(200_000));
        assert_eq!(out.positions[1].action_amount, dec!(300_000));
        assert_eq!(out.total_sell, Decimal::ZERO);
    }

    #[test]
    fn test_small_adjustment_is_hold() {
        let input = AllocationInput {
            holdings: vec![holding("equity", dec!(6_050)), holding("debt", dec!(3_950))],
            targets: vec![target("equity", dec!(60)), target("debt", dec!(40))],
            fresh_investment: None,
        };
        let out = rebalance(&input).result;
        assert!(out.positions.iter().all(|p| p.action == RebalanceAction::Hold));
        assert!(out.positions.iter().all(|p| p.action_amount.is_zero()));
        assert!(out.is_balanced);
    }

    #[test]
    fn test_missing_holding_counts_as_zero() {
        let mut input = sixty_forty();
        input.targets.push(target("gold", dec!(10)));
        input.targets[0].target_percent = dec!(50);
        let out = rebalance(&input).result;
        let gold = &out.positions[2];
        assert_eq!(gold.current_value, Decimal::ZERO);
        assert_eq!(gold.action, RebalanceAction::Buy);
        assert_eq!(gold.action_amount, dec!(100_000));
    }

    #[test]
    fn test_targets_not_summing_to_100_warn() {
        let mut input = sixty_forty();
        input.targets[1].target_percent = dec!(30);
        let out = rebalance(&input);
        assert!(out.warnings.iter().any(|w| w.contains("90")));
    }

    #[test]
    fn test_empty_input_returns_zero() {
        let mut input = sixty_forty();
        input.holdings.clear();
        let out = rebalance(&input);
        assert!(out.result.positions.is_empty());
        assert_eq!(out.result.total_value, Decimal::ZERO);
    }

    #[test]
    fn test_values_beyond_decimal_range_return_zero() {
        let input = AllocationInput {
            holdings: vec![holding("equity", Decimal::MAX), holding("debt", Decimal::MAX)],
            targets: vec![target("equity", dec!(60)), target("debt", dec!(40))],
            fresh_investment: None,
        };
        let out = rebalance(&input);
        assert!(out.result.positions.is_empty());
        assert!(out.warnings.iter().any(|w| w.contains("total_value")));

        let input = AllocationInput {
            holdings: vec![holding("equity", dec!(70_000_000_000_000_000_000_000_000_000))],
            targets: vec![target("equity", dec!(200))],
            fresh_investment: None,
        };
        let out = rebalance(&input);
        assert!(out.result.positions.is_empty());
        assert!(out.warnings.iter().any(|w| w.contains("decimal range")));
    }
}
