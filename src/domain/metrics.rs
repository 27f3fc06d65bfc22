//! Performance summary of a finished backtest.

use crate::domain::account::EquityPoint;
use crate::domain::backtest::BacktestResult;
use crate::domain::signal::TradeSignal;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub round_trips: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    /// Mean return of winning round trips, as a fraction of the capital
    /// committed, net of cost.
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
    /// Longest run of rows spent below a previous equity peak.
    pub max_drawdown_duration: usize,
    /// Share of rows that ended with a position open.
    pub exposure: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult) -> Self {
        let account = &result.account;
        let returns = round_trip_returns(result);

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for &r in &returns {
            if r > 0.0 {
                trades_won += 1;
                total_wins += r;
                largest_win = largest_win.max(r);
            } else if r < 0.0 {
                trades_lost += 1;
                total_losses += r.abs();
                largest_loss = largest_loss.max(r.abs());
            }
        }

        let round_trips = returns.len();
        let win_rate = if round_trips > 0 {
            trades_won as f64 / round_trips as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };
        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&account.equity_curve);

        let rows = account.equity_curve.len();
        let exposure = if rows > 0 {
            let held = account
                .equity_curve
                .iter()
                .filter(|p| p.shares > 0.0)
                .count();
            held as f64 / rows as f64
        } else {
            0.0
        };

        Metrics {
            total_return: result.total_return(),
            round_trips,
            trades_won,
            trades_lost,
            win_rate,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            profit_factor,
            max_drawdown,
            max_drawdown_duration,
            exposure,
        }
    }
}

/// Cash before each entry compared with cash after its exit.
fn round_trip_returns(result: &BacktestResult) -> Vec<f64> {
    let mut cash = result.account.initial_capital;
    let mut returns = Vec::new();
    for record in result.trades() {
        if record.signal == TradeSignal::Sell {
            returns.push(record.proceeds / cash - 1.0);
            cash = record.proceeds;
        }
    }
    returns
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut duration = 0usize;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
            duration += 1;
            max_duration = max_duration.max(duration);
        }
    }

    (max_dd, max_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::{BacktestConfig, run_backtest};
    use crate::domain::signal::SignalFrame;
    use TradeSignal::*;
    use approx::assert_relative_eq;

    fn backtest(closes: &[f64], signals: &[TradeSignal], cost: f64) -> BacktestResult {
        let timestamps = (0..closes.len() as i64).map(|i| i * 3_600_000).collect();
        let frame = SignalFrame::new(timestamps, closes.to_vec(), signals.to_vec()).unwrap();
        run_backtest(&frame, &BacktestConfig::new(1000.0, cost).unwrap()).unwrap()
    }

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                timestamp: i as i64,
                shares: 0.0,
                equity,
            })
            .collect()
    }

    #[test]
    fn no_trades() {
        let m = Metrics::compute(&backtest(&[1.0, 2.0, 3.0], &[Hold, Hold, Hold], 0.0));
        assert_eq!(m.round_trips, 0);
        assert_eq!(m.trades_won, 0);
        assert_eq!(m.trades_lost, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert_eq!(m.exposure, 0.0);
        assert_eq!(m.total_return, 0.0);
    }

    #[test]
    fn wins_and_losses() {
        // +10%, -50%, +20%
        let m = Metrics::compute(&backtest(
            &[100.0, 110.0, 100.0, 50.0, 50.0, 60.0],
            &[Buy, Sell, Buy, Sell, Buy, Sell],
            0.0,
        ));
        assert_eq!(m.round_trips, 3);
        assert_eq!(m.trades_won, 2);
        assert_eq!(m.trades_lost, 1);
        assert_relative_eq!(m.win_rate, 2.0 / 3.0);
        assert_relative_eq!(m.avg_win, 0.15, epsilon = 1e-12);
        assert_relative_eq!(m.largest_win, 0.2, epsilon = 1e-12);
        assert_relative_eq!(m.largest_loss, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.profit_factor, 0.3 / 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.total_return, 1.1 * 0.5 * 1.2 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn only_wins_gives_infinite_profit_factor() {
        let m = Metrics::compute(&backtest(&[100.0, 110.0], &[Buy, Sell], 0.0));
        assert!(m.profit_factor.is_infinite());
        assert_eq!(m.win_rate, 1.0);
    }

    #[test]
    fn returns_are_net_of_cost() {
        let m = Metrics::compute(&backtest(&[100.0, 100.0], &[Buy, Sell], 0.01));
        assert_eq!(m.trades_lost, 1);
        // 10 held back, 9.9 shares sold at 99% of 100
        assert_relative_eq!(m.avg_loss, 1.0 - (0.01 + 0.99 * 0.99), epsilon = 1e-12);
    }

    #[test]
    fn forced_close_counts_as_round_trip() {
        let m = Metrics::compute(&backtest(&[100.0, 120.0], &[Buy, Hold], 0.0));
        assert_eq!(m.round_trips, 1);
        assert_relative_eq!(m.largest_win, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn forced_close_cost_shows_in_drawdown() {
        let m = Metrics::compute(&backtest(&[100.0, 100.0], &[Buy, Hold], 0.1));
        // 1000 -> 100 cash + 9 shares, sold at 90% of 100
        assert_relative_eq!(m.total_return, -0.09, epsilon = 1e-12);
        assert_relative_eq!(m.max_drawdown, 0.09, epsilon = 1e-12);
        assert_eq!(m.max_drawdown_duration, 1);
    }

    #[test]
    fn exposure_counts_rows_in_position() {
        let m = Metrics::compute(&backtest(
            &[100.0, 101.0, 102.0, 103.0],
            &[Hold, Buy, Hold, Sell],
            0.0,
        ));
        assert_relative_eq!(m.exposure, 0.5);
    }

    #[test]
    fn max_drawdown() {
        let (dd, _) = compute_drawdown(&curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]));
        assert_relative_eq!(dd, 30.0 / 110.0);
    }

    #[test]
    fn max_drawdown_duration() {
        let (_, duration) = compute_drawdown(&curve(&[100.0, 110.0, 100.0, 90.0, 85.0, 95.0]));
        assert_eq!(duration, 4);
    }

    #[test]
    fn drawdown_of_empty_curve() {
        assert_eq!(compute_drawdown(&[]), (0.0, 0));
    }
}
