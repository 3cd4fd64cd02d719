//! Provider data handed to every resource and data source on configure

use crate::api::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct NetboxProviderData {
    pub client: Arc<Client>,
}

impl NetboxProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}
