#![allow(dead_code)]

use time::macros::date;
use time::{Date, Duration};

use application::service::{CatalogService, CustomerService};
use application::transfer::{CreateCustomerDto, CreateItemDto};
use engine::AppModule;
use kernel::prelude::entity::RentalPolicy;
use kernel::KernelError;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Day `n` counted from the first checkout of every scenario.
pub fn day(n: i64) -> Date {
    date!(2024 - 01 - 01) + Duration::days(n)
}

pub fn engine() -> AppModule {
    engine_with(RentalPolicy::default())
}

pub fn engine_with(policy: RentalPolicy) -> AppModule {
    init_tracing();
    AppModule::new(policy)
}

pub fn add_item(app: &AppModule, id: &str, copies: i64) -> error_stack::Result<(), KernelError> {
    app.add_item(CreateItemDto {
        id: id.to_string(),
        title: format!("Webtoon {id}"),
        copy_count: copies,
    })?;
    Ok(())
}

pub fn register(app: &AppModule, id: &str) -> error_stack::Result<(), KernelError> {
    app.register_customer(CreateCustomerDto {
        id: id.to_string(),
        name: format!("Reader {id}"),
    })?;
    Ok(())
}
