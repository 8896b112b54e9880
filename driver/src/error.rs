use error_stack::Report;
use kernel::KernelError;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Io(std::io::Error),
    #[error(transparent)]
    Env(dotenvy::Error),
    #[error(transparent)]
    Serde(serde_json::Error),
    #[error(transparent)]
    Persist(tempfile::PersistError),
}

impl From<std::io::Error> for DriverError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<dotenvy::Error> for DriverError {
    fn from(value: dotenvy::Error) -> Self {
        Self::Env(value)
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

impl From<tempfile::PersistError> for DriverError {
    fn from(value: tempfile::PersistError) -> Self {
        Self::Persist(value)
    }
}

pub trait ConvertError {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}

impl<T, E> ConvertError for Result<T, E>
where
    E: Into<DriverError>,
{
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let error: DriverError = error.into();
            let context = match &error {
                DriverError::Serde(_) => KernelError::CorruptState,
                DriverError::Env(_) => KernelError::InvalidInput,
                DriverError::Io(_) | DriverError::Persist(_) => KernelError::Internal,
            };
            Report::new(error).change_context(context)
        })
    }
}
