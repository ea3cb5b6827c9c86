use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a liability schedule breaks its ordering rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObligationError {
    #[error("the liability schedule is empty")]
    Empty,
    #[error("obligation amount must not be negative, got {amount} due {due_date}")]
    NegativeAmount { due_date: NaiveDate, amount: Decimal },
    #[error("obligation dates must be strictly increasing: {previous} is followed by {next}")]
    NotIncreasing { previous: NaiveDate, next: NaiveDate },
    #[error("obligation due {due_date} precedes settlement {settlement}")]
    BeforeSettlement {
        due_date: NaiveDate,
        settlement: NaiveDate,
    },
}

/// A required cash outflow.
///
/// # Examples
///
/// ```
/// use dedicated_portfolio::core::obligation::Obligation;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let due = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
/// let obligation = Obligation::new(due, dec!(250_000));
/// assert_eq!(obligation.amount(), dec!(250_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    due_date: NaiveDate,
    amount: Decimal,
}

impl Obligation {
    pub fn new(due_date: NaiveDate, amount: Decimal) -> Self {
        Self { due_date, amount }
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// An ordered liability schedule.
///
/// Construction enforces strictly increasing due dates and non-negative
/// amounts, so every consumer can rely on consecutive obligations forming
/// disjoint cash windows. A zero amount is a placeholder date that still
/// splits the windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationSchedule {
    obligations: Vec<Obligation>,
}

impl ObligationSchedule {
    pub fn new(obligations: Vec<Obligation>) -> Result<Self, ObligationError> {
        if obligations.is_empty() {
            return Err(ObligationError::Empty);
        }
        for ob in &obligations {
            if ob.amount() < Decimal::ZERO {
                return Err(ObligationError::NegativeAmount {
                    due_date: ob.due_date(),
                    amount: ob.amount(),
                });
            }
        }
        for pair in obligations.windows(2) {
            if pair[1].due_date() <= pair[0].due_date() {
                return Err(ObligationError::NotIncreasing {
                    previous: pair[0].due_date(),
                    next: pair[1].due_date(),
                });
            }
        }
        Ok(Self { obligations })
    }

    /// Check that nothing is due before the settlement date.
    pub fn ensure_after(&self, settlement: NaiveDate) -> Result<(), ObligationError> {
        match self.obligations.first() {
            Some(first) if first.due_date() < settlement => Err(ObligationError::BeforeSettlement {
                due_date: first.due_date(),
                settlement,
            }),
            _ => Ok(()),
        }
    }

    pub fn obligations(&self) -> &[Obligation] {
        &self.obligations
    }

    pub fn len(&self) -> usize {
        self.obligations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obligations.is_empty()
    }

    /// Total of all required amounts.
    pub fn total(&self) -> Decimal {
        self.obligations.iter().map(|o| o.amount()).sum()
    }

    pub fn last_due_date(&self) -> Option<NaiveDate> {
        self.obligations.last().map(|o| o.due_date())
    }

    /// The `(low, high]` date window funding each obligation, in order.
    /// The first window opens at settlement.
    pub fn windows(&self, settlement: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
        let mut low = settlement;
        self.obligations
            .iter()
            .map(|ob| {
                let window = (low, ob.due_date());
                low = ob.due_date();
                window
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_schedule_total() {
        let schedule = ObligationSchedule::new(vec![
            Obligation::new(ymd(2024, 6, 1), dec!(100)),
            Obligation::new(ymd(2024, 12, 1), dec!(200)),
        ])
        .unwrap();
        assert_eq!(schedule.total(), dec!(300));
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.last_due_date(), Some(ymd(2024, 12, 1)));
    }

    #[test]
    fn test_empty_schedule() {
        assert_eq!(ObligationSchedule::new(vec![]).unwrap_err(), ObligationError::Empty);
    }

    #[test]
    fn test_dates_must_increase() {
        let err = ObligationSchedule::new(vec![
            Obligation::new(ymd(2024, 6, 1), dec!(100)),
            Obligation::new(ymd(2024, 6, 1), dec!(200)),
        ])
        .unwrap_err();
        assert!(matches!(err, ObligationError::NotIncreasing { .. }));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err =
            ObligationSchedule::new(vec![Obligation::new(ymd(2024, 6, 1), dec!(-5))]).unwrap_err();
        assert!(matches!(err, ObligationError::NegativeAmount { .. }));
    }

    #[test]
    fn test_zero_amount_accepted() {
        let schedule = ObligationSchedule::new(vec![
            Obligation::new(ymd(2024, 6, 1), dec!(0)),
            Obligation::new(ymd(2024, 12, 1), dec!(200)),
        ])
        .unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.total(), dec!(200));
    }

    #[test]
    fn test_before_settlement() {
        let schedule =
            ObligationSchedule::new(vec![Obligation::new(ymd(2024, 1, 1), dec!(100))]).unwrap();
        assert!(schedule.ensure_after(ymd(2024, 1, 1)).is_ok());
        assert!(matches!(
            schedule.ensure_after(ymd(2024, 1, 2)),
            Err(ObligationError::BeforeSettlement { .. })
        ));
    }

    #[test]
    fn test_windows_chain() {
        let schedule = ObligationSchedule::new(vec![
            Obligation::new(ymd(2024, 6, 1), dec!(100)),
            Obligation::new(ymd(2024, 12, 1), dec!(200)),
        ])
        .unwrap();
        assert_eq!(
            schedule.windows(ymd(2024, 1, 15)),
            vec![
                (ymd(2024, 1, 15), ymd(2024, 6, 1)),
                (ymd(2024, 6, 1), ymd(2024, 12, 1)),
            ]
        );
    }
}
