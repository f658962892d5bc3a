use std::collections::HashMap;

use tracing::debug;

use crate::error::{ModelError, ModelResult};

use super::{
    model::Product,
    notify::{Listener, SubscriptionId},
};

/// Products indexed by their unique name, iterated in registration order.
#[derive(Debug, Default)]
pub struct ProductRegistry {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl ProductRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product. Names must be unique.
    pub fn insert(&mut self, product: Product) -> ModelResult<()> {
        if self.index.contains_key(product.name()) {
            return Err(ModelError::Configuration(format!(
                "duplicate product name '{}'",
                product.name()
            )));
        }
        debug!(product = %product.name(), "registering product");
        self.index
            .insert(product.name().to_string(), self.products.len());
        self.products.push(product);
        Ok(())
    }

    pub fn get(&self, name: &str) -> ModelResult<&Product> {
        self.index
            .get(name)
            .map(|&slot| &self.products[slot])
            .ok_or_else(|| ModelError::NotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> ModelResult<&mut Product> {
        match self.index.get(name) {
            Some(&slot) => Ok(&mut self.products[slot]),
            None => Err(ModelError::NotFound(name.to_string())),
        }
    }

    /// Attach a listener to the named product.
    pub fn subscribe(&mut self, name: &str, listener: Listener) -> ModelResult<SubscriptionId> {
        Ok(self.get_mut(name)?.subscribe(listener))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(Product::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Product> {
        self.products.iter_mut()
    }
}
