//! In-memory collections standing in for NetBox in binding tests

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::dcim::{
    ConsolePort, ConsolePortListParams, ConsolePortTemplate, WritableConsolePortTemplate,
};
use crate::api::{
    ApiError, ChoiceValue, ListCollection, ListParams, Listing, NestedRef, NestedTag,
    RemoteCollection,
};

pub fn port(id: i64, name: &str, device: i64, tags: &[&str]) -> ConsolePort {
    ConsolePort {
        id,
        name: name.to_string(),
        description: String::new(),
        label: String::new(),
        device: Some(NestedRef {
            id: device,
            display: None,
            name: None,
        }),
        module: None,
        port_type: None,
        tags: tags
            .iter()
            .enumerate()
            .map(|(i, slug)| NestedTag {
                id: i as i64 + 1,
                name: slug.to_string(),
                slug: slug.to_string(),
            })
            .collect(),
        occupied: false,
        mark_connected: false,
    }
}

/// Console port listing with NetBox's filter semantics for name, tag,
/// device_id and limit
pub struct FakePorts {
    ports: Vec<ConsolePort>,
    calls: AtomicUsize,
}

impl FakePorts {
    pub fn new(ports: Vec<ConsolePort>) -> Self {
        Self {
            ports,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListCollection for FakePorts {
    type Entity = ConsolePort;
    type Params = ConsolePortListParams;

    async fn list(&self, params: &ConsolePortListParams) -> Result<Listing<ConsolePort>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let matching: Vec<ConsolePort> = self
            .ports
            .iter()
            .filter(|p| params.name.as_ref().map_or(true, |n| &p.name == n))
            .filter(|p| {
                params
                    .tag
                    .iter()
                    .all(|slug| p.tags.iter().any(|t| &t.slug == slug))
            })
            .filter(|p| {
                params.device_id.as_ref().map_or(true, |d| {
                    p.device.as_ref().map(|r| r.id.to_string()).as_ref() == Some(d)
                })
            })
            .cloned()
            .collect();

        let count = matching.len() as i64;
        let results = match params.limit() {
            Some(limit) => matching.into_iter().take(limit as usize).collect(),
            None => matching,
        };
        Ok(Listing { count, results })
    }
}

/// Console port template store with PATCH semantics. Every update body is
/// recorded as JSON.
#[derive(Default)]
pub struct FakeTemplates {
    records: Mutex<BTreeMap<i64, ConsolePortTemplate>>,
    updates: Mutex<Vec<serde_json::Value>>,
}

impl FakeTemplates {
    pub fn updates(&self) -> Vec<serde_json::Value> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }

    pub fn remove(&self, id: i64) {
        if let Ok(mut records) = self.records.lock() {
            records.remove(&id);
        }
    }

    fn not_found(id: i64) -> ApiError {
        ApiError::NotFound {
            path: format!("/api/dcim/console-port-templates/{}/", id),
        }
    }
}

fn nested(id: Option<i64>) -> Option<NestedRef> {
    id.map(|id| NestedRef {
        id,
        display: None,
        name: None,
    })
}

fn patch(record: &mut ConsolePortTemplate, body: &WritableConsolePortTemplate) {
    record.name = body.name.clone();
    if let Some(description) = &body.description {
        record.description = description.clone();
    }
    if let Some(label) = &body.label {
        record.label = label.clone();
    }
    if let Some(port_type) = &body.port_type {
        record.port_type = Some(ChoiceValue {
            value: Some(port_type.clone()).filter(|v| !v.is_empty()),
            label: None,
        });
    }
    if body.device_type.is_some() {
        record.device_type = nested(body.device_type);
    }
    if body.module_type.is_some() {
        record.module_type = nested(body.module_type);
    }
}

#[async_trait]
impl RemoteCollection for FakeTemplates {
    type Entity = ConsolePortTemplate;
    type Writable = WritableConsolePortTemplate;

    async fn create(
        &self,
        body: &WritableConsolePortTemplate,
    ) -> Result<ConsolePortTemplate, ApiError> {
        let mut records = self.records.lock().map_err(|e| ApiError::Parse(e.to_string()))?;
        let id = records.keys().next_back().copied().unwrap_or(0) + 1;
        let mut record = ConsolePortTemplate {
            id,
            name: String::new(),
            description: String::new(),
            label: String::new(),
            port_type: None,
            device_type: None,
            module_type: None,
        };
        patch(&mut record, body);
        records.insert(id, record.clone());
        Ok(record)
    }

    async fn read(&self, id: i64) -> Result<ConsolePortTemplate, ApiError> {
        let records = self.records.lock().map_err(|e| ApiError::Parse(e.to_string()))?;
        records.get(&id).cloned().ok_or_else(|| Self::not_found(id))
    }

    async fn update(
        &self,
        id: i64,
        body: &WritableConsolePortTemplate,
    ) -> Result<ConsolePortTemplate, ApiError> {
        let json = serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(json);
        }

        let mut records = self.records.lock().map_err(|e| ApiError::Parse(e.to_string()))?;
        let record = records.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        patch(record, body);
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let mut records = self.records.lock().map_err(|e| ApiError::Parse(e.to_string()))?;
        records.remove(&id).map(|_| ()).ok_or_else(|| Self::not_found(id))
    }
}
