mod common;

use application::service::{CatalogService, CustomerService, IntegrityService, RentalService};
use application::transfer::{
    CheckoutDto, CopyDto, CreateCustomerDto, CreateItemDto, CustomerRentalsDto, GetCustomerDto,
    GetItemDto, GetRentalDto, RentalDto, ReturnDto,
};
use engine::AppModule;
use kernel::interface::session::{DependOnSessionHealth, SessionHealth};
use kernel::prelude::entity::{
    CopyStatus, Fee, FeeRate, LoanPeriod, RentLimit, RentalPolicy, RentalStatus,
};
use kernel::KernelError;

use crate::common::{add_item, day, engine, engine_with, register};

fn checkout(
    app: &AppModule,
    customer: &str,
    item: &str,
    on: i64,
) -> error_stack::Result<RentalDto, KernelError> {
    app.checkout(CheckoutDto {
        customer_id: customer.to_string(),
        item_id: item.to_string(),
        today: day(on),
    })
}

fn copies(app: &AppModule, item: &str) -> error_stack::Result<Vec<CopyStatus>, KernelError> {
    let item = app
        .get_item(GetItemDto {
            id: item.to_string(),
        })?
        .unwrap();
    Ok(item.copies)
}

fn active_count(app: &AppModule, customer: &str) -> error_stack::Result<u32, KernelError> {
    let customer = app
        .get_customer(GetCustomerDto {
            id: customer.to_string(),
        })?
        .unwrap();
    Ok(customer.active_rentals)
}

#[test]
fn late_return_is_charged_per_day() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 3)?;
    register(&app, "C")?;

    let rental = checkout(&app, "C", "W1", 0)?;
    assert_eq!(rental.copy_index, 0);
    assert_eq!(rental.due_date, day(14));
    assert_eq!(rental.status, RentalStatus::Rented);
    assert_eq!(copies(&app, "W1")?[0], CopyStatus::Rented);
    assert_eq!(active_count(&app, "C")?, 1);

    let returned = app.return_item(ReturnDto {
        rental_id: rental.id,
        today: day(20),
    })?;
    assert_eq!(returned.fee, 3000);
    assert_eq!(returned.rental.status, RentalStatus::Returned);
    assert_eq!(returned.rental.returned_at, Some(day(20)));
    assert_eq!(returned.rental.fee, Some(3000));
    assert_eq!(copies(&app, "W1")?, vec![CopyStatus::Available; 3]);
    assert_eq!(active_count(&app, "C")?, 0);
    app.audit()
}

#[test]
fn same_day_return_is_free() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 1)?;
    register(&app, "C")?;

    let rental = checkout(&app, "C", "W1", 3)?;
    let returned = app.return_item(ReturnDto {
        rental_id: rental.id,
        today: day(3),
    })?;
    assert_eq!(returned.fee, 0);
    assert_eq!(copies(&app, "W1")?, vec![CopyStatus::Available]);
    app.audit()
}

#[test]
fn copies_are_assigned_lowest_index_first() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 3)?;
    register(&app, "A")?;
    register(&app, "B")?;

    let first = checkout(&app, "A", "W1", 0)?;
    let second = checkout(&app, "B", "W1", 0)?;
    assert_eq!((first.copy_index, second.copy_index), (0, 1));

    app.return_item(ReturnDto {
        rental_id: first.id,
        today: day(1),
    })?;
    let third = checkout(&app, "B", "W1", 2)?;
    assert_eq!(third.copy_index, 0);
    assert_eq!(
        app.find_available_copy(GetItemDto {
            id: "W1".to_string()
        })?,
        2
    );
    Ok(())
}

#[test]
fn checkout_without_copies_changes_nothing() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 1)?;
    register(&app, "A")?;
    register(&app, "B")?;
    checkout(&app, "A", "W1", 0)?;

    let before = app.export()?;
    let report = checkout(&app, "B", "W1", 1).unwrap_err();
    assert_eq!(report.current_context(), &KernelError::NoCopyAvailable);
    assert_eq!(app.export()?, before);
    assert_eq!(active_count(&app, "B")?, 0);
    assert!(!app.session_health().is_halted());
    app.audit()
}

#[test]
fn unknown_ids_are_rejected_without_side_effects() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 1)?;
    register(&app, "A")?;
    let before = app.export()?;

    let report = checkout(&app, "ghost", "W1", 0).unwrap_err();
    assert_eq!(report.current_context(), &KernelError::CustomerNotFound);
    let report = checkout(&app, "A", "missing", 0).unwrap_err();
    assert_eq!(report.current_context(), &KernelError::ItemNotFound);
    let report = app
        .return_item(ReturnDto {
            rental_id: uuid::Uuid::new_v4(),
            today: day(0),
        })
        .unwrap_err();
    assert_eq!(report.current_context(), &KernelError::RentalNotFound);

    assert_eq!(app.export()?, before);
    Ok(())
}

#[test]
fn rental_limit_is_enforced() -> error_stack::Result<(), KernelError> {
    let policy = RentalPolicy::new(
        LoanPeriod::default(),
        FeeRate::default(),
        None,
        RentLimit::new(2u32),
    );
    let app = engine_with(policy);
    add_item(&app, "W1", 5)?;
    register(&app, "C")?;

    checkout(&app, "C", "W1", 0)?;
    let second = checkout(&app, "C", "W1", 0)?;
    assert!(!app.can_rent(GetCustomerDto {
        id: "C".to_string()
    })?);
    let report = checkout(&app, "C", "W1", 0).unwrap_err();
    assert_eq!(report.current_context(), &KernelError::RentalLimitExceeded);
    assert_eq!(
        app.available_copies(GetItemDto {
            id: "W1".to_string()
        })?,
        3
    );

    app.return_item(ReturnDto {
        rental_id: second.id,
        today: day(1),
    })?;
    assert!(app.can_rent(GetCustomerDto {
        id: "C".to_string()
    })?);
    checkout(&app, "C", "W1", 1)?;
    app.audit()
}

#[test]
fn second_return_fails_and_changes_nothing() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 2)?;
    register(&app, "C")?;
    let rental = checkout(&app, "C", "W1", 0)?;

    app.return_item(ReturnDto {
        rental_id: rental.id,
        today: day(16),
    })?;
    let after_first = app.export()?;

    let report = app
        .return_item(ReturnDto {
            rental_id: rental.id,
            today: day(30),
        })
        .unwrap_err();
    assert_eq!(report.current_context(), &KernelError::AlreadyReturned);
    assert_eq!(app.export()?, after_first);
    assert!(!app.session_health().is_halted());
    Ok(())
}

#[test]
fn return_before_checkout_is_invalid() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 1)?;
    register(&app, "C")?;
    let rental = checkout(&app, "C", "W1", 5)?;
    let before = app.export()?;

    let report = app
        .return_item(ReturnDto {
            rental_id: rental.id,
            today: day(4),
        })
        .unwrap_err();
    assert_eq!(report.current_context(), &KernelError::InvalidInput);
    assert_eq!(app.export()?, before);
    Ok(())
}

#[test]
fn fee_is_capped_when_configured() -> error_stack::Result<(), KernelError> {
    let policy = RentalPolicy::new(
        LoanPeriod::new(7u32),
        FeeRate::new(1000u64),
        Some(Fee::new(5000u64)),
        RentLimit::default(),
    );
    let app = engine_with(policy);
    add_item(&app, "W1", 1)?;
    register(&app, "C")?;
    let rental = checkout(&app, "C", "W1", 0)?;
    assert_eq!(rental.due_date, day(7));

    let rental_query = GetRentalDto {
        id: rental.id,
        today: day(10),
    };
    assert_eq!(app.assess_fee(rental_query)?, 3000);

    let returned = app.return_item(ReturnDto {
        rental_id: rental.id,
        today: day(40),
    })?;
    assert_eq!(returned.fee, 5000);
    assert_eq!(
        app.assess_fee(GetRentalDto {
            id: rental.id,
            today: day(100),
        })?,
        5000
    );
    Ok(())
}

#[test]
fn overdue_query_is_lazy_and_restartable() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 3)?;
    register(&app, "A")?;
    register(&app, "B")?;
    let early = checkout(&app, "A", "W1", 0)?;
    let late = checkout(&app, "B", "W1", 5)?;
    let returned = checkout(&app, "A", "W1", 0)?;
    app.return_item(ReturnDto {
        rental_id: returned.id,
        today: day(30),
    })?;

    assert_eq!(app.query_overdue(day(14))?.iter().count(), 0);

    let before = app.export()?;
    let overdue = app.query_overdue(day(20))?;
    let listed: Vec<_> = overdue.iter().collect();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].rental.id, early.id);
    assert_eq!(listed[0].days_late, 6);
    assert_eq!(listed[0].accrued_fee, 3000);
    assert_eq!(listed[1].rental.id, late.id);
    assert_eq!(listed[1].days_late, 1);
    assert!(listed
        .iter()
        .all(|overdue| overdue.rental.status == RentalStatus::Overdue));

    let again: Vec<_> = overdue.iter().map(|overdue| overdue.rental.id).collect();
    assert_eq!(again, vec![early.id, late.id]);
    assert_eq!(app.export()?, before);

    let rental = app
        .get_rental(GetRentalDto {
            id: early.id,
            today: day(20),
        })?
        .unwrap();
    assert_eq!(rental.status, RentalStatus::Overdue);
    Ok(())
}

#[test]
fn active_rentals_are_listed_per_customer() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 2)?;
    add_item(&app, "W2", 1)?;
    register(&app, "A")?;
    register(&app, "B")?;
    let first = checkout(&app, "A", "W1", 0)?;
    let second = checkout(&app, "A", "W2", 1)?;
    checkout(&app, "B", "W1", 1)?;
    app.return_item(ReturnDto {
        rental_id: first.id,
        today: day(2),
    })?;

    let held = app.active_rentals_of(CustomerRentalsDto {
        customer_id: "A".to_string(),
        today: day(3),
    })?;
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].id, second.id);
    assert_eq!(held[0].item_id, "W2");

    let report = app
        .active_rentals_of(CustomerRentalsDto {
            customer_id: "nobody".to_string(),
            today: day(3),
        })
        .unwrap_err();
    assert_eq!(report.current_context(), &KernelError::CustomerNotFound);
    Ok(())
}

#[test]
fn catalog_and_registry_reject_bad_input() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 1)?;
    register(&app, "C")?;

    let report = add_item(&app, "W1", 2).unwrap_err();
    assert_eq!(report.current_context(), &KernelError::DuplicateItem);
    let report = add_item(&app, "W2", 0).unwrap_err();
    assert_eq!(report.current_context(), &KernelError::InvalidInput);
    let report = app
        .add_item(CreateItemDto {
            id: "W3".to_string(),
            title: "Negative".to_string(),
            copy_count: -2,
        })
        .unwrap_err();
    assert_eq!(report.current_context(), &KernelError::InvalidInput);
    let report = app
        .register_customer(CreateCustomerDto {
            id: "C".to_string(),
            name: "Someone else".to_string(),
        })
        .unwrap_err();
    assert_eq!(report.current_context(), &KernelError::DuplicateCustomer);

    let report = app
        .can_rent(GetCustomerDto {
            id: "ghost".to_string(),
        })
        .unwrap_err();
    assert_eq!(report.current_context(), &KernelError::CustomerNotFound);
    let report = app
        .find_available_copy(GetItemDto {
            id: "missing".to_string(),
        })
        .unwrap_err();
    assert_eq!(report.current_context(), &KernelError::ItemNotFound);

    assert_eq!(app.list_items()?.len(), 1);
    assert_eq!(app.list_customers()?.len(), 1);
    assert!(!app.session_health().is_halted());
    Ok(())
}

#[test]
fn catalog_flags_double_rent_as_invalid_transition() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 2)?;
    let copy = CopyDto {
        item_id: "W1".to_string(),
        copy_index: 1,
    };
    app.mark_rented(copy)?;
    let report = app
        .mark_rented(CopyDto {
            item_id: "W1".to_string(),
            copy_index: 1,
        })
        .unwrap_err();
    assert_eq!(report.current_context(), &KernelError::InvalidStateTransition);
    assert!(!app.session_health().is_halted());

    app.mark_available(CopyDto {
        item_id: "W1".to_string(),
        copy_index: 1,
    })?;
    assert_eq!(copies(&app, "W1")?, vec![CopyStatus::Available; 2]);
    Ok(())
}

#[test]
fn invariant_violation_halts_until_reset() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 1)?;
    register(&app, "C")?;

    let report = app
        .decrement_active(GetCustomerDto {
            id: "C".to_string(),
        })
        .unwrap_err();
    assert_eq!(report.current_context(), &KernelError::InvariantViolation);
    assert!(app.session_health().is_halted());

    let report = checkout(&app, "C", "W1", 0).unwrap_err();
    assert_eq!(report.current_context(), &KernelError::InvariantViolation);
    let report = add_item(&app, "W2", 1).unwrap_err();
    assert_eq!(report.current_context(), &KernelError::InvariantViolation);

    // Reads keep working.
    assert_eq!(app.list_items()?.len(), 1);
    assert_eq!(active_count(&app, "C")?, 0);

    let app = engine();
    add_item(&app, "W1", 1)?;
    register(&app, "C")?;
    checkout(&app, "C", "W1", 0)?;
    Ok(())
}

#[test]
fn audit_catches_a_rented_copy_without_record() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 2)?;
    app.audit()?;

    app.mark_rented(CopyDto {
        item_id: "W1".to_string(),
        copy_index: 0,
    })?;
    let report = app.audit().unwrap_err();
    assert_eq!(report.current_context(), &KernelError::InvariantViolation);
    assert!(app.session_health().is_halted());
    Ok(())
}

#[test]
fn active_count_follows_the_ledger() -> error_stack::Result<(), KernelError> {
    let app = engine();
    add_item(&app, "W1", 4)?;
    register(&app, "C")?;
    let rentals = (0..3)
        .map(|n| checkout(&app, "C", "W1", n))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(active_count(&app, "C")?, 3);

    app.increment_active(GetCustomerDto {
        id: "C".to_string(),
    })?;
    assert_eq!(active_count(&app, "C")?, 4);
    app.decrement_active(GetCustomerDto {
        id: "C".to_string(),
    })?;

    for rental in &rentals {
        app.return_item(ReturnDto {
            rental_id: rental.id,
            today: day(10),
        })?;
    }
    assert_eq!(active_count(&app, "C")?, 0);
    app.audit()
}
