use serde::{Deserialize, Serialize};

// ============ Stripe Models ============

/// A Stripe PaymentIntent, reduced to the fields the sync needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Payment {
    /// PaymentIntent id (`pi_...`), used as invoice reference.
    pub id: String,
    /// Amount in minor units (cents).
    pub amount: i64,
    /// Creation time as unix seconds.
    pub created: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Stripe customer id, when the payment is attached to one.
    #[serde(default)]
    pub customer: Option<String>,
}

/// One page of a Stripe list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

/// Result of an incremental payment fetch.
#[derive(Debug, Clone, Default)]
pub struct PaymentBatch {
    pub payments: Vec<Payment>,
    /// Stripe still reported `has_more` after the last fetched page.
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaxId {
    pub value: String,
}

/// A Stripe customer. Deleted customers come back as `{id, deleted: true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    /// Only present when requested with `expand[]=tax_ids`.
    #[serde(default, deserialize_with = "deserialize_tax_ids")]
    pub tax_ids: Vec<TaxId>,
    #[serde(default)]
    pub deleted: bool,
}

fn deserialize_tax_ids<'de, D>(deserializer: D) -> Result<Vec<TaxId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let list: Option<StripeList<TaxId>> = Option::deserialize(deserializer)?;
    Ok(list.map(|l| l.data).unwrap_or_default())
}

// ============ Moneybird Models ============

/// Moneybird sends ids as strings; older endpoints may still emit numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(u64),
}

impl From<IdRepr> for String {
    fn from(id: IdRepr) -> Self {
        match id {
            IdRepr::Text(s) => s,
            IdRepr::Number(n) => n.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    IdRepr::deserialize(deserializer).map(String::from)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(String::from))
}

/// Body of a Moneybird contact create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_invoices_to_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl From<&Customer> for NewContact {
    /// Maps a Stripe customer onto Moneybird contact fields.
    fn from(customer: &Customer) -> Self {
        let address = customer.address.clone().unwrap_or_default();
        let email = non_blank(&customer.email);

        Self {
            company_name: non_blank(&customer.name),
            firstname: None,
            lastname: None,
            send_invoices_to_email: email.clone(),
            email,
            phone: non_blank(&customer.phone),
            address1: non_blank(&address.line1),
            address2: non_blank(&address.line2),
            zipcode: non_blank(&address.postal_code),
            city: non_blank(&address.city),
            country: non_blank(&address.country),
            tax_number: customer
                .tax_ids
                .iter()
                .map(|t| t.value.trim())
                .find(|v| !v.is_empty())
                .map(str::to_string),
        }
    }
}

/// A Moneybird contact as returned by search and create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub send_invoices_to_email: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceDetail {
    pub description: String,
    /// Decimal string, e.g. `"12.34"`.
    pub price: String,
    pub amount: String,
    pub tax_rate_id: String,
}

/// Body of a Moneybird external sales invoice create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewExternalSalesInvoice {
    pub contact_id: String,
    /// `YYYY-MM-DD`
    pub document_date: String,
    pub reference: String,
    pub description: String,
    pub source: String,
    pub source_url: String,
    pub details_attributes: Vec<InvoiceDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExternalSalesInvoice {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}
