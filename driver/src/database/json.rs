use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use error_stack::{Report, ResultExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use time::Date;

use kernel::interface::database::SnapshotGateway;
use kernel::prelude::entity::{Customer, Item, RentalRecord, Snapshot};
use kernel::KernelError;

use crate::config::data_dir_from_env;
use crate::error::{ConvertError, DriverError};

use self::{customer::*, item::*, rental::*};

mod customer;
mod item;
mod rental;

const CATALOG: &str = "catalog.json";
const CUSTOMERS: &str = "customers.json";
const RENTALS: &str = "rentals.json";

/// Stores the catalog, the customer registry and the rental ledger as three JSON
/// documents in one directory.
pub struct JsonSnapshotGateway {
    dir: PathBuf,
}

impl JsonSnapshotGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> error_stack::Result<Self, KernelError> {
        Ok(Self::new(data_dir_from_env()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotGateway for JsonSnapshotGateway {
    fn load(&self) -> error_stack::Result<Snapshot, KernelError> {
        let items = JsonInternal::read::<ItemDocument>(&self.dir.join(CATALOG))?
            .into_iter()
            .map(Item::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let customers = JsonInternal::read::<CustomerDocument>(&self.dir.join(CUSTOMERS))?
            .into_iter()
            .map(Customer::from)
            .collect::<Vec<_>>();
        let rentals = JsonInternal::read::<RentalDocument>(&self.dir.join(RENTALS))?
            .into_iter()
            .map(RentalRecord::from)
            .collect::<Vec<_>>();
        tracing::info!(
            "Loaded {} items, {} customers, {} rentals from {}",
            items.len(),
            customers.len(),
            rentals.len(),
            self.dir.display()
        );
        Ok(Snapshot::new(items, customers, rentals))
    }

    fn save(&self, snapshot: &Snapshot, as_of: &Date) -> error_stack::Result<(), KernelError> {
        std::fs::create_dir_all(&self.dir)
            .convert_error()
            .attach_printable_lazy(|| format!("Cannot create {}", self.dir.display()))?;
        let items: Vec<ItemDocument> = snapshot.items().iter().map(ItemDocument::from).collect();
        let customers: Vec<CustomerDocument> = snapshot
            .customers()
            .iter()
            .map(CustomerDocument::from)
            .collect();
        let rentals: Vec<RentalDocument> = snapshot
            .rentals()
            .iter()
            .map(|rental| RentalDocument::new(rental, as_of))
            .collect();
        let staged = [
            JsonInternal::stage(&self.dir, CATALOG, &items)?,
            JsonInternal::stage(&self.dir, CUSTOMERS, &customers)?,
            JsonInternal::stage(&self.dir, RENTALS, &rentals)?,
        ];
        JsonInternal::replace(staged)?;
        tracing::info!("Saved snapshot as of {as_of} to {}", self.dir.display());
        Ok(())
    }
}

pub(in crate::database) struct JsonInternal;

impl JsonInternal {
    /// A document that does not exist yet reads as an empty collection.
    fn read<T: DeserializeOwned>(path: &Path) -> error_stack::Result<Vec<T>, KernelError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} does not exist, starting empty", path.display());
                return Ok(Vec::new());
            }
            Err(error) => {
                return Err::<Vec<T>, _>(error)
                    .convert_error()
                    .attach_printable_lazy(|| format!("Cannot open {}", path.display()));
            }
        };
        serde_json::from_reader(BufReader::new(file))
            .convert_error()
            .attach_printable_lazy(|| format!("Malformed document {}", path.display()))
    }

    /// Writes the documents to a temp file beside `name`. Dropping the result
    /// deletes the temp file and leaves `name` untouched.
    fn stage<T: Serialize>(
        dir: &Path,
        name: &str,
        documents: &[T],
    ) -> error_stack::Result<Staged, KernelError> {
        let temp = NamedTempFile::new_in(dir).convert_error()?;
        let mut writer = BufWriter::new(temp);
        serde_json::to_writer_pretty(&mut writer, documents)
            .map_err(|error| Report::new(DriverError::from(error)))
            .change_context(KernelError::Internal)
            .attach_printable_lazy(|| format!("Cannot serialize {name}"))?;
        writer.flush().convert_error()?;
        let temp = writer
            .into_inner()
            .map_err(|error| error.into_error())
            .convert_error()?;
        temp.as_file().sync_all().convert_error()?;
        Ok(Staged {
            temp,
            target: dir.join(name),
        })
    }

    /// Renames every staged file over its target.
    fn replace<const N: usize>(staged: [Staged; N]) -> error_stack::Result<(), KernelError> {
        for Staged { temp, target } in staged {
            temp.persist(&target)
                .convert_error()
                .attach_printable_lazy(|| format!("Cannot replace {}", target.display()))?;
        }
        Ok(())
    }
}

struct Staged {
    temp: NamedTempFile,
    target: PathBuf,
}
