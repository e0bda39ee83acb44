//! In-memory repositories
//!
//! Data is not persisted and will be lost on restart.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use orb_domain::entities::{Machine, Request, Template};
use orb_domain::error::{Error, Result};
use orb_domain::repositories::{MachineRepository, RequestRepository, TemplateRepository};
use orb_domain::value_objects::{RequestFilter, RequestId};
use std::hash::Hash;

/// Entities with an optimistic-concurrency version
trait Versioned: Clone {
    const ENTITY: &'static str;

    fn key(&self) -> String;
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
}

impl Versioned for Request {
    const ENTITY: &'static str = "request";

    fn key(&self) -> String {
        self.request_id.to_string()
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl Versioned for Machine {
    const ENTITY: &'static str = "machine";

    fn key(&self) -> String {
        self.machine_id.clone()
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl Versioned for Template {
    const ENTITY: &'static str = "template";

    fn key(&self) -> String {
        self.template_id.clone()
    }
    fn version(&self) -> u64 {
        self.version
    }
    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

fn insert<K, T>(map: &DashMap<K, T>, key: K, entity: &T) -> Result<T>
where
    K: Eq + Hash,
    T: Versioned,
{
    match map.entry(key) {
        Entry::Occupied(existing) => Err(Error::version_conflict(
            T::ENTITY,
            entity.key(),
            0,
            existing.get().version(),
        )),
        Entry::Vacant(slot) => {
            let mut stored = entity.clone();
            stored.set_version(1);
            slot.insert(stored.clone());
            Ok(stored)
        }
    }
}

fn compare_and_swap<K, T>(map: &DashMap<K, T>, key: &K, entity: &T) -> Result<T>
where
    K: Eq + Hash,
    T: Versioned,
{
    let mut current = map
        .get_mut(key)
        .ok_or_else(|| Error::not_found(format!("{} {}", T::ENTITY, entity.key())))?;
    if current.version() != entity.version() {
        return Err(Error::version_conflict(
            T::ENTITY,
            entity.key(),
            entity.version(),
            current.version(),
        ));
    }
    let mut stored = entity.clone();
    stored.set_version(entity.version() + 1);
    *current = stored.clone();
    Ok(stored)
}

/// In-memory request repository
#[derive(Default)]
pub struct InMemoryRequestRepository {
    requests: DashMap<RequestId, Request>,
}

impl InMemoryRequestRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn save(&self, request: &Request) -> Result<Request> {
        insert(&self.requests, request.request_id.clone(), request)
    }

    async fn get(&self, request_id: &RequestId) -> Result<Option<Request>> {
        Ok(self.requests.get(request_id).map(|r| r.value().clone()))
    }

    async fn update(&self, request: &Request) -> Result<Request> {
        compare_and_swap(&self.requests, &request.request_id, request)
    }

    async fn query(&self, filter: &RequestFilter) -> Result<Vec<Request>> {
        let mut matched: Vec<Request> = self
            .requests
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matched.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.request_id.as_str().cmp(b.request_id.as_str()))
        });
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }
}

/// In-memory machine repository
#[derive(Default)]
pub struct InMemoryMachineRepository {
    machines: DashMap<String, Machine>,
}

impl InMemoryMachineRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MachineRepository for InMemoryMachineRepository {
    async fn save(&self, machine: &Machine) -> Result<Machine> {
        insert(&self.machines, machine.machine_id.clone(), machine)
    }

    async fn get(&self, machine_id: &str) -> Result<Option<Machine>> {
        Ok(self.machines.get(machine_id).map(|m| m.value().clone()))
    }

    async fn update(&self, machine: &Machine) -> Result<Machine> {
        compare_and_swap(&self.machines, &machine.machine_id, machine)
    }

    async fn list_by_request(&self, request_id: &RequestId) -> Result<Vec<Machine>> {
        let mut machines: Vec<Machine> = self
            .machines
            .iter()
            .filter(|entry| &entry.value().request_id == request_id)
            .map(|entry| entry.value().clone())
            .collect();
        machines.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.machine_id.cmp(&b.machine_id))
        });
        Ok(machines)
    }
}

/// In-memory template repository
#[derive(Default)]
pub struct InMemoryTemplateRepository {
    templates: DashMap<String, Template>,
}

impl InMemoryTemplateRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn save(&self, template: &Template) -> Result<Template> {
        insert(&self.templates, template.template_id.clone(), template)
    }

    async fn get(&self, template_id: &str) -> Result<Option<Template>> {
        Ok(self.templates.get(template_id).map(|t| t.value().clone()))
    }

    async fn update(&self, template: &Template) -> Result<Template> {
        compare_and_swap(&self.templates, &template.template_id, template)
    }

    async fn list(&self) -> Result<Vec<Template>> {
        let mut templates: Vec<Template> =
            self.templates.iter().map(|t| t.value().clone()).collect();
        templates.sort_by(|a, b| a.template_id.cmp(&b.template_id));
        Ok(templates)
    }
}
