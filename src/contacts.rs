//! Find-or-create of Moneybird contacts by natural key.

use crate::errors::{AppError, ResultExt};
use crate::models::{ContactRecord, Customer, NewContact};
use crate::moneybird_client::MoneybirdClient;
use moka::future::Cache;

/// Business field used to recognise an existing contact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NaturalKey {
    TaxNumber(String),
    Email(String),
    CompanyName(String),
}

impl NaturalKey {
    /// Picks the strongest available key: tax number, then email, then
    /// company name.
    pub fn for_contact(contact: &NewContact) -> Option<Self> {
        if let Some(tax) = contact.tax_number.clone() {
            return Some(NaturalKey::TaxNumber(tax));
        }
        if let Some(email) = contact.email.clone() {
            return Some(NaturalKey::Email(email));
        }
        contact.company_name.clone().map(NaturalKey::CompanyName)
    }

    pub fn value(&self) -> &str {
        match self {
            NaturalKey::TaxNumber(v) | NaturalKey::Email(v) | NaturalKey::CompanyName(v) => v,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            NaturalKey::TaxNumber(_) => "tax_number",
            NaturalKey::Email(_) => "email",
            NaturalKey::CompanyName(_) => "company_name",
        }
    }

    /// Exact equality on the same field of `record`.
    pub fn matches(&self, record: &ContactRecord) -> bool {
        let value = Some(self.value());
        match self {
            NaturalKey::TaxNumber(_) => record.tax_number.as_deref() == value,
            NaturalKey::Email(_) => {
                record.email.as_deref() == value
                    || record.send_invoices_to_email.as_deref() == value
            }
            NaturalKey::CompanyName(_) => record.company_name.as_deref() == value,
        }
    }

    fn cache_key(&self) -> String {
        format!("{}:{}", self.field(), self.value())
    }
}

/// Outcome of resolving a customer to a Moneybird contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub contact_id: String,
    pub created: bool,
}

/// Resolves Stripe customers to Moneybird contacts, creating them on demand.
///
/// Ids resolved during the resolver's lifetime are remembered, so a
/// counterparty paying twice in one batch is looked up once.
pub struct ContactResolver {
    moneybird: MoneybirdClient,
    resolved: Cache<String, String>,
}

impl ContactResolver {
    pub fn new(moneybird: MoneybirdClient) -> Self {
        Self {
            moneybird,
            resolved: Cache::builder().max_capacity(10_000).build(),
        }
    }

    /// Returns `Ok(None)` when the customer carries no usable natural key.
    pub async fn resolve(&self, customer: &Customer) -> Result<Option<Resolution>, AppError> {
        let contact = NewContact::from(customer);
        let key = match NaturalKey::for_contact(&contact) {
            Some(key) => key,
            None => {
                tracing::warn!(
                    "Customer {} has no tax number, email or name to match on",
                    customer.id
                );
                return Ok(None);
            }
        };

        if let Some(contact_id) = self.resolved.get(&key.cache_key()).await {
            tracing::debug!("Contact for {} already resolved this run", key.value());
            return Ok(Some(Resolution {
                contact_id,
                created: false,
            }));
        }

        let resolution = self
            .find_or_create(&key, &contact)
            .await
            .with_context(|| format!("Failed to resolve Moneybird contact for {}", customer.id))?;

        self.resolved
            .insert(key.cache_key(), resolution.contact_id.clone())
            .await;
        Ok(Some(resolution))
    }

    async fn find_or_create(
        &self,
        key: &NaturalKey,
        contact: &NewContact,
    ) -> Result<Resolution, AppError> {
        let candidates = self.moneybird.search_contacts(key.value()).await?;

        if let Some(existing) = candidates.iter().find(|c| key.matches(c)) {
            tracing::info!(
                "Found existing contact for {} ({}={}): {}",
                contact.company_name.as_deref().unwrap_or("-"),
                key.field(),
                key.value(),
                existing.id
            );
            return Ok(Resolution {
                contact_id: existing.id.clone(),
                created: false,
            });
        }

        let created = self.moneybird.create_contact(contact).await?;
        tracing::info!(
            "Created new contact for {} ({}={}): {}",
            contact.company_name.as_deref().unwrap_or("-"),
            key.field(),
            key.value(),
            created.id
        );
        Ok(Resolution {
            contact_id: created.id,
            created: true,
        })
    }
}
