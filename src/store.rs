//! Rule store: read access to the current catalog snapshot
//!
//! Readers get an `Arc<Catalog>` and price against it; admin edits build
//! a new catalog and swap it in, so a resolution in flight never sees a
//! half-applied change.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::method::{MethodId, RuleSet, ShippingMethod};
use std::sync::{Arc, PoisonError, RwLock};

/// Source of shipping method snapshots
pub trait RuleStore: Send + Sync {
    /// The current catalog
    fn snapshot(&self) -> Arc<Catalog>;

    fn get_method(&self, id: MethodId) -> Option<ShippingMethod> {
        self.snapshot().get(id).cloned()
    }

    /// Rules of a method; an existing method without rules yields an empty set
    fn get_rule_set(&self, id: MethodId) -> Option<RuleSet> {
        self.snapshot()
            .get(id)
            .map(|m| m.rules.clone().unwrap_or_default())
    }
}

/// Rule store held in memory, swapped wholesale on every change
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    current: RwLock<Arc<Catalog>>,
}

impl InMemoryRuleStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Replace the whole catalog
    pub fn replace(&self, catalog: Catalog) {
        tracing::info!(hash = %catalog.stamp().hash, "replacing shipping catalog");
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(catalog);
    }

    /// All methods in display order, including disabled ones
    pub fn list_all(&self) -> Vec<ShippingMethod> {
        self.snapshot().methods().to_vec()
    }

    /// Add a method; `id` and `code` must both be new
    pub fn create(&self, method: ShippingMethod) -> Result<ShippingMethod> {
        self.modify(|methods| {
            if let Some(existing) = methods
                .iter()
                .find(|m| m.id == method.id || m.code == method.code)
            {
                return Err(Error::DuplicateMethod(format!(
                    "id {} / code '{}' collides with method '{}'",
                    method.id, method.code, existing.code
                )));
            }
            methods.push(method.clone());
            Ok(method.clone())
        })
    }

    /// Replace a method's record; the code stays as first created
    pub fn update(&self, id: MethodId, mut method: ShippingMethod) -> Result<ShippingMethod> {
        self.modify(|methods| {
            let slot = find_mut(methods, id)?;
            method.id = id;
            method.code = slot.code.clone();
            *slot = method.clone();
            Ok(method.clone())
        })
    }

    /// Flip `enabled`
    pub fn toggle(&self, id: MethodId) -> Result<ShippingMethod> {
        self.modify(|methods| {
            let slot = find_mut(methods, id)?;
            slot.enabled = !slot.enabled;
            Ok(slot.clone())
        })
    }

    pub fn delete(&self, id: MethodId) -> Result<ShippingMethod> {
        self.modify(|methods| {
            let index = methods
                .iter()
                .position(|m| m.id == id)
                .ok_or_else(|| Error::MethodNotFound(id.to_string()))?;
            Ok(methods.remove(index))
        })
    }

    /// Apply `change` to a copy of the methods and publish the result
    fn modify<T>(&self, change: impl FnOnce(&mut Vec<ShippingMethod>) -> Result<T>) -> Result<T> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut methods = current.methods().to_vec();
        let out = change(&mut methods)?;
        let catalog = Catalog::new(methods, current.provinces().to_vec());
        tracing::debug!(hash = %catalog.stamp().hash, "shipping catalog updated");
        *current = Arc::new(catalog);
        Ok(out)
    }
}

impl RuleStore for InMemoryRuleStore {
    fn snapshot(&self) -> Arc<Catalog> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RuleStore for Arc<Catalog> {
    fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(self)
    }
}

fn find_mut(methods: &mut [ShippingMethod], id: MethodId) -> Result<&mut ShippingMethod> {
    methods
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| Error::MethodNotFound(id.to_string()))
}
