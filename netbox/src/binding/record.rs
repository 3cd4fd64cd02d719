//! CRUD contract for one entity kind

use std::marker::PhantomData;
use tracing::{debug, warn};

use super::codec::FieldCodec;
use super::BindingError;
use crate::api::RemoteCollection;

/// Result of refreshing a record that may have been deleted out of band
#[derive(Debug)]
pub enum ReadOutcome<E> {
    Present(E),
    Absent,
}

/// Binds a codec to a remote collection. Reads and deletes treat a missing
/// record as absent rather than as an error.
pub struct RecordBinding<C, R> {
    remote: R,
    codec: PhantomData<fn() -> C>,
}

impl<C, R> RecordBinding<C, R>
where
    C: FieldCodec,
    R: RemoteCollection<Entity = C::Entity, Writable = C::Writable>,
{
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            codec: PhantomData,
        }
    }

    pub async fn create(&self, fields: &C::Fields) -> Result<C::Entity, BindingError> {
        debug!("Creating {}: {:?}", C::LABEL, fields);
        let body = C::encode(fields);
        let entity = self.remote.create(&body).await?;
        debug!("Created {} {}", C::LABEL, C::entity_id(&entity));
        Ok(entity)
    }

    pub async fn read(&self, id: i64) -> Result<ReadOutcome<C::Entity>, BindingError> {
        match self.remote.read(id).await {
            Ok(entity) => Ok(ReadOutcome::Present(entity)),
            Err(e) if e.is_not_found() => {
                warn!("{} {} not found, removing from state", C::LABEL, id);
                Ok(ReadOutcome::Absent)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Scalars are always re-sent; the codec decides which references go out
    pub async fn update(
        &self,
        id: i64,
        prior: &C::Fields,
        planned: &C::Fields,
    ) -> Result<C::Entity, BindingError> {
        debug!("Updating {} {}: {:?}", C::LABEL, id, planned);
        let body = C::encode_update(prior, planned);
        Ok(self.remote.update(id, &body).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), BindingError> {
        match self.remote.delete(id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!("{} {} already deleted", C::LABEL, id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
