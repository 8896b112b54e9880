use error_stack::Report;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection};
use kernel::interface::query::{DependOnItemQuery, ItemQuery};
use kernel::interface::session::{DependOnSessionHealth, SessionHealth};
use kernel::interface::update::{DependOnItemModifier, ItemModifier};
use kernel::prelude::entity::{CopyIndex, Item, ItemId, ItemTitle};
use kernel::KernelError;

use crate::service::atomically;
use crate::transfer::{CopyDto, CreateItemDto, GetItemDto, ItemDto};

pub trait CatalogService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnItemQuery
    + DependOnItemModifier
    + DependOnSessionHealth
{
    /// Registers an item whose copies all start AVAILABLE.
    fn add_item(&self, dto: CreateItemDto) -> error_stack::Result<ItemDto, KernelError> {
        self.session_health().ensure_operational()?;
        let item = Item::create(ItemId::new(dto.id), ItemTitle::new(dto.title), dto.copy_count)?;
        let con = self.database_connection().transact()?;
        atomically(self.session_health(), con, |con| {
            self.item_modifier().create(con, &item)
        })?;
        tracing::info!("Added item {} with {} copies", item.id(), item.copy_count());
        Ok(ItemDto::from(item))
    }

    fn get_item(&self, dto: GetItemDto) -> error_stack::Result<Option<ItemDto>, KernelError> {
        let mut con = self.database_connection().transact()?;
        let item = self
            .item_query()
            .find_by_id(&mut con, &ItemId::new(dto.id))?;
        Ok(item.map(ItemDto::from))
    }

    fn list_items(&self) -> error_stack::Result<Vec<ItemDto>, KernelError> {
        let mut con = self.database_connection().transact()?;
        let items = self.item_query().find_all(&mut con)?;
        Ok(items.into_iter().map(ItemDto::from).collect())
    }

    /// Index of the lowest AVAILABLE copy. Nothing is reserved.
    fn find_available_copy(&self, dto: GetItemDto) -> error_stack::Result<usize, KernelError> {
        let mut con = self.database_connection().transact()?;
        let copy = self
            .item_query()
            .find_available_copy(&mut con, &ItemId::new(dto.id))?;
        Ok(copy.into())
    }

    fn available_copies(&self, dto: GetItemDto) -> error_stack::Result<usize, KernelError> {
        let id = ItemId::new(dto.id);
        let mut con = self.database_connection().transact()?;
        let item = self.item_query().find_by_id(&mut con, &id)?.ok_or_else(|| {
            Report::new(KernelError::ItemNotFound).attach_printable(format!("Item {id} not found"))
        })?;
        Ok(item.available_count())
    }

    /// Low-level status flip. Fails with `InvalidStateTransition` when the copy is
    /// already RENTED. Checkouts reserve copies on their own.
    fn mark_rented(&self, dto: CopyDto) -> error_stack::Result<(), KernelError> {
        self.session_health().ensure_operational()?;
        let id = ItemId::new(dto.item_id);
        let copy = CopyIndex::new(dto.copy_index);
        let con = self.database_connection().transact()?;
        atomically(self.session_health(), con, |con| {
            self.item_modifier().mark_rented(con, &id, &copy)
        })
    }

    fn mark_available(&self, dto: CopyDto) -> error_stack::Result<(), KernelError> {
        self.session_health().ensure_operational()?;
        let id = ItemId::new(dto.item_id);
        let copy = CopyIndex::new(dto.copy_index);
        let con = self.database_connection().transact()?;
        atomically(self.session_health(), con, |con| {
            self.item_modifier().mark_available(con, &id, &copy)
        })
    }
}

impl<T> CatalogService for T where
    T: DependOnDatabaseConnection + DependOnItemQuery + DependOnItemModifier + DependOnSessionHealth
{
}
