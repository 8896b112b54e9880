use std::env::VarError;
use std::path::PathBuf;
use std::str::FromStr;

use error_stack::Report;
use kernel::prelude::entity::{Fee, FeeRate, LoanPeriod, RentLimit, RentalPolicy};
use kernel::KernelError;

use crate::env;
use crate::error::{ConvertError, DriverError};

const LOAN_PERIOD_DAYS: &str = "RENTAL_LOAN_PERIOD_DAYS";
const FEE_PER_DAY: &str = "RENTAL_FEE_PER_DAY";
const MAX_FEE: &str = "RENTAL_MAX_FEE";
const RENT_LIMIT: &str = "RENTAL_RENT_LIMIT";
const DATA_DIR: &str = "RENTAL_DATA_DIR";

const DEFAULT_DATA_DIR: &str = "./data";

/// Builds the rental policy from the environment (and `.env`), falling back to the
/// defaults for every variable that is not set.
pub fn policy_from_env() -> error_stack::Result<RentalPolicy, KernelError> {
    let defaults = RentalPolicy::default();
    let loan_period = positive::<u32>(LOAN_PERIOD_DAYS)?
        .map(LoanPeriod::new)
        .unwrap_or(*defaults.loan_period());
    let fee_rate = positive::<u64>(FEE_PER_DAY)?
        .map(FeeRate::new)
        .unwrap_or(*defaults.fee_rate());
    let max_fee = positive::<u64>(MAX_FEE)?
        .map(Fee::new)
        .or(*defaults.max_fee());
    let rent_limit = positive::<u32>(RENT_LIMIT)?
        .map(RentLimit::new)
        .unwrap_or(*defaults.rent_limit());
    let policy = RentalPolicy::new(loan_period, fee_rate, max_fee, rent_limit);
    tracing::debug!("Rental policy: {policy:?}");
    Ok(policy)
}

pub fn data_dir_from_env() -> error_stack::Result<PathBuf, KernelError> {
    Ok(lookup(DATA_DIR)?
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)))
}

fn lookup(key: &str) -> error_stack::Result<Option<String>, KernelError> {
    match env(key) {
        Ok(value) => Ok(Some(value)),
        Err(DriverError::Env(dotenvy::Error::EnvVar(VarError::NotPresent))) => Ok(None),
        Err(error) => Err::<Option<String>, _>(error)
            .convert_error()
            .map_err(|report| report.attach_printable(format!("Cannot read {key}"))),
    }
}

fn positive<T>(key: &str) -> error_stack::Result<Option<T>, KernelError>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(key)? else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(Some(value)),
        _ => Err(Report::new(KernelError::InvalidInput)
            .attach_printable(format!("{key} must be a positive integer. Given: {raw}"))),
    }
}
