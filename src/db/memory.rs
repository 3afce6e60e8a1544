use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::customer::{Customer, CustomerRepository, RepositoryError};

/// HashMap-backed repository.
///
/// Counts calls and can be told to fail, which makes it the test double for
/// the lookup handler and the HTTP adapter.
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: Mutex<HashMap<String, Customer>>,
    failure: Mutex<Option<RepositoryError>>,
    requested: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: Vec<Customer>) -> Self {
        let repo = Self::new();
        for customer in customers {
            repo.insert(customer);
        }
        repo
    }

    pub fn insert(&self, customer: Customer) {
        self.customers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(customer.cpf.clone(), customer);
    }

    /// Every following lookup fails with `error` until `recover` is called.
    pub fn fail_with(&self, error: RepositoryError) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = Some(error);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// CPFs passed to `find_by_cpf`, in call order
    pub fn requested_cpfs(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Customer>, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(cpf.to_string());

        if let Some(error) = self.failure.lock().unwrap_or_else(|p| p.into_inner()).clone() {
            return Err(error);
        }

        let found = self
            .customers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(cpf)
            .cloned();

        tracing::debug!(cpf = %cpf, found = found.is_some(), "In-memory customer lookup");
        Ok(found)
    }
}
