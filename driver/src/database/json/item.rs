use error_stack::Report;
use serde::{Deserialize, Serialize};

use kernel::prelude::entity::{CopyStatus, Item, ItemId, ItemTitle};
use kernel::KernelError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::database) struct ItemDocument {
    id: String,
    title: String,
    copy_count: i64,
    copy_statuses: Vec<CopyStatus>,
}

impl From<&Item> for ItemDocument {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id().as_ref().clone(),
            title: item.title().as_ref().clone(),
            copy_count: i64::try_from(item.copy_count()).unwrap_or(i64::MAX),
            copy_statuses: item.copies().clone(),
        }
    }
}

impl TryFrom<ItemDocument> for Item {
    type Error = Report<KernelError>;

    fn try_from(document: ItemDocument) -> Result<Self, Self::Error> {
        let listed = document.copy_statuses.len();
        if document.copy_count < 1 || usize::try_from(document.copy_count) != Ok(listed) {
            return Err(Report::new(KernelError::CorruptState).attach_printable(format!(
                "Item {} declares {} copies but lists {listed} statuses",
                document.id, document.copy_count
            )));
        }
        Ok(Item::new(
            ItemId::new(document.id),
            ItemTitle::new(document.title),
            document.copy_statuses,
        ))
    }
}
