use std::ops::Deref;
use std::sync::Arc;

use time::Date;
use vodca::References;

use application::service::IntegrityService;
use driver::config::policy_from_env;
use driver::database::{
    MemoryCustomerRepository, MemoryDatabase, MemoryItemRepository, MemoryRentalRepository,
};
use kernel::interface::database::{DependOnDatabaseConnection, SnapshotGateway};
use kernel::interface::policy::DependOnRentalPolicy;
use kernel::interface::query::{DependOnCustomerQuery, DependOnItemQuery, DependOnRentalQuery};
use kernel::interface::session::{DependOnSessionHealth, SessionHealth};
use kernel::interface::update::{
    DependOnCustomerModifier, DependOnItemModifier, DependOnRentalModifier,
};
use kernel::prelude::entity::{RentalPolicy, Snapshot};
use kernel::KernelError;

/// One rental engine: a store and the policy it runs under.
///
/// Cheap to clone; clones share the same store. Every service in
/// `application::service` is callable on it.
#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    /// An empty engine. Building a new one is how a halted session is reset.
    pub fn new(policy: RentalPolicy) -> Self {
        Self(Arc::new(Handler::init(MemoryDatabase::new(), policy)))
    }

    /// An empty engine configured from the environment.
    pub fn from_env() -> error_stack::Result<Self, KernelError> {
        Ok(Self::new(policy_from_env()?))
    }

    /// Loads the persisted state. Nothing runs on a snapshot that fails validation.
    pub fn load<G: SnapshotGateway>(
        gateway: &G,
        policy: RentalPolicy,
    ) -> error_stack::Result<Self, KernelError> {
        let snapshot = gateway.load()?;
        warn_over_limit(&snapshot, &policy);
        let database = MemoryDatabase::restore(snapshot)?;
        Ok(Self(Arc::new(Handler::init(database, policy))))
    }

    /// Audits the live state and writes it through `gateway`. Refused while halted.
    pub fn save<G: SnapshotGateway>(
        &self,
        gateway: &G,
        today: &Date,
    ) -> error_stack::Result<(), KernelError> {
        self.session_health().ensure_operational()?;
        let snapshot = self.checked_export()?;
        gateway.save(&snapshot, today)
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

#[derive(References)]
pub struct Handler {
    database: MemoryDatabase,
    policy: RentalPolicy,
}

impl Handler {
    pub fn init(database: MemoryDatabase, policy: RentalPolicy) -> Self {
        Self { database, policy }
    }
}

// The limit may have been lowered since the snapshot was saved. Such customers
// simply cannot rent until they are back under it.
fn warn_over_limit(snapshot: &Snapshot, policy: &RentalPolicy) {
    for customer in snapshot.customers() {
        if customer.active_rentals().as_ref() > policy.rent_limit().as_ref() {
            tracing::warn!(
                "Customer {} holds {} rentals, above the limit of {}",
                customer.id(),
                customer.active_rentals().as_ref(),
                policy.rent_limit().as_ref()
            );
        }
    }
}

impl DependOnDatabaseConnection for Handler {
    type DatabaseConnection = MemoryDatabase;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        &self.database
    }
}

impl DependOnSessionHealth for Handler {
    type SessionHealth = MemoryDatabase;
    fn session_health(&self) -> &Self::SessionHealth {
        &self.database
    }
}

impl DependOnRentalPolicy for Handler {
    fn rental_policy(&self) -> &RentalPolicy {
        &self.policy
    }
}

impl DependOnItemQuery for Handler {
    type ItemQuery = MemoryItemRepository;
    fn item_query(&self) -> &Self::ItemQuery {
        &MemoryItemRepository
    }
}

impl DependOnItemModifier for Handler {
    type ItemModifier = MemoryItemRepository;
    fn item_modifier(&self) -> &Self::ItemModifier {
        &MemoryItemRepository
    }
}

impl DependOnCustomerQuery for Handler {
    type CustomerQuery = MemoryCustomerRepository;
    fn customer_query(&self) -> &Self::CustomerQuery {
        &MemoryCustomerRepository
    }
}

impl DependOnCustomerModifier for Handler {
    type CustomerModifier = MemoryCustomerRepository;
    fn customer_modifier(&self) -> &Self::CustomerModifier {
        &MemoryCustomerRepository
    }
}

impl DependOnRentalQuery for Handler {
    type RentalQuery = MemoryRentalRepository;
    fn rental_query(&self) -> &Self::RentalQuery {
        &MemoryRentalRepository
    }
}

impl DependOnRentalModifier for Handler {
    type RentalModifier = MemoryRentalRepository;
    fn rental_modifier(&self) -> &Self::RentalModifier {
        &MemoryRentalRepository
    }
}
