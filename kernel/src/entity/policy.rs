mod fee_rate;
mod loan_period;
mod rent_limit;

pub use self::{fee_rate::*, loan_period::*, rent_limit::*};
use crate::entity::{DueDate, Fee};
use destructure::Mutation;
use time::Date;
use vodca::References;

/// Policy constants shared by the ledger, the registry and the fee calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, References, Mutation)]
pub struct RentalPolicy {
    loan_period: LoanPeriod,
    fee_rate: FeeRate,
    max_fee: Option<Fee>,
    rent_limit: RentLimit,
}

impl RentalPolicy {
    pub fn new(
        loan_period: LoanPeriod,
        fee_rate: FeeRate,
        max_fee: Option<Fee>,
        rent_limit: RentLimit,
    ) -> Self {
        Self {
            loan_period,
            fee_rate,
            max_fee,
            rent_limit,
        }
    }

    /// Overdue fee for a copy due on `due_date` and returned on `returned_on`.
    ///
    /// Zero when returned on or before the due date, otherwise
    /// `days_late * fee_rate`, capped by `max_fee` when one is configured.
    pub fn compute_fee(&self, due_date: &DueDate, returned_on: &Date) -> Fee {
        let days_late = (*returned_on - *due_date.as_ref()).whole_days();
        if days_late <= 0 {
            return Fee::zero();
        }
        let days_late = u64::try_from(days_late).unwrap_or(u64::MAX);
        let fee = Fee::new(days_late.saturating_mul(*self.fee_rate.as_ref()));
        match self.max_fee {
            Some(cap) => fee.min(cap),
            None => fee,
        }
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use time::macros::date;
    use time::{Date, Duration};

    use crate::entity::{DueDate, Fee, FeeRate, LoanPeriod, RentLimit, RentalPolicy};

    fn due() -> DueDate {
        DueDate::new(date!(2024 - 01 - 15))
    }

    #[test]
    fn defaults() {
        let policy = RentalPolicy::default();
        assert_eq!(policy.loan_period(), &LoanPeriod::new(14u32));
        assert_eq!(policy.fee_rate(), &FeeRate::new(500u64));
        assert_eq!(policy.max_fee(), &None);
        assert_eq!(policy.rent_limit(), &RentLimit::new(5u32));
    }

    #[test]
    fn on_time_returns_are_free() {
        let policy = RentalPolicy::default();
        assert_eq!(policy.compute_fee(&due(), &date!(2024 - 01 - 01)), Fee::zero());
        assert_eq!(policy.compute_fee(&due(), &date!(2024 - 01 - 15)), Fee::zero());
    }

    #[test]
    fn six_days_late() {
        let policy = RentalPolicy::default();
        assert_eq!(
            policy.compute_fee(&due(), &date!(2024 - 01 - 21)),
            Fee::new(3000u64)
        );
    }

    #[test]
    fn cap_applies() {
        let mut policy = RentalPolicy::default();
        policy.substitute(|policy| *policy.max_fee = Some(Fee::new(2000u64)));
        assert_eq!(
            policy.compute_fee(&due(), &date!(2024 - 01 - 21)),
            Fee::new(2000u64)
        );
        assert_eq!(
            policy.compute_fee(&due(), &date!(2024 - 01 - 17)),
            Fee::new(1000u64)
        );
    }

    fn day(offset: i64) -> Date {
        date!(2024 - 01 - 15) + Duration::days(offset)
    }

    proptest! {
        #[test]
        fn fee_is_monotonic(a in -400i64..400, b in -400i64..400, rate in 0u64..10_000, cap in proptest::option::of(0u64..100_000)) {
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let policy = RentalPolicy::new(
                LoanPeriod::default(),
                FeeRate::new(rate),
                cap.map(Fee::new),
                RentLimit::default(),
            );
            prop_assert!(policy.compute_fee(&due(), &day(early)) <= policy.compute_fee(&due(), &day(late)));
        }

        #[test]
        fn fee_never_exceeds_cap(offset in 0i64..1000, cap in 0u64..100_000) {
            let policy = RentalPolicy::new(
                LoanPeriod::default(),
                FeeRate::default(),
                Some(Fee::new(cap)),
                RentLimit::default(),
            );
            prop_assert!(policy.compute_fee(&due(), &day(offset)) <= Fee::new(cap));
        }
    }
}
