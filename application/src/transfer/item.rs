use kernel::prelude::entity::{CopyStatus, DestructItem, Item};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDto {
    pub id: String,
    pub title: String,
    pub copies: Vec<CopyStatus>,
    pub available: usize,
}

impl From<Item> for ItemDto {
    fn from(value: Item) -> Self {
        let available = value.available_count();
        let DestructItem { id, title, copies } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            copies,
            available,
        }
    }
}

impl ItemDto {
    pub fn copy_count(&self) -> usize {
        self.copies.len()
    }
}

pub struct CreateItemDto {
    pub id: String,
    pub title: String,
    pub copy_count: i64,
}

pub struct GetItemDto {
    pub id: String,
}

pub struct CopyDto {
    pub item_id: String,
    pub copy_index: usize,
}
