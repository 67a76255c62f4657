use crate::errors::{error_for_status, AppError};
use crate::models::{ContactRecord, ExternalSalesInvoice, NewContact, NewExternalSalesInvoice};
use serde_json::json;
use std::time::Duration;

/// Moneybird's maximum page size.
const INVOICES_PER_PAGE: usize = 100;

/// Client for the Moneybird API, scoped to one administration.
#[derive(Clone)]
pub struct MoneybirdClient {
    client: reqwest::Client,
    base_url: String,
    administration_id: String,
    token: String,
}

impl MoneybirdClient {
    /// Creates a new `MoneybirdClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://moneybird.com/api/v2`.
    /// * `administration_id` - Administration all requests are scoped to.
    /// * `token` - API token for bearer authentication.
    /// * `timeout` - Per-request timeout.
    pub fn new(
        base_url: String,
        administration_id: String,
        token: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Moneybird client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            administration_id,
            token,
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url, self.administration_id, resource
        )
    }

    /// Full-text contact search. Callers must filter for exact matches.
    pub async fn search_contacts(&self, query: &str) -> Result<Vec<ContactRecord>, AppError> {
        let url = reqwest::Url::parse_with_params(&self.endpoint("contacts.json"), &[("query", query)])
            .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::debug!("Moneybird: Searching contacts for {}", query);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Moneybird contact search failed: {}", e))
            })?;

        let response = error_for_status(response, "Moneybird contact search").await?;

        let contacts: Vec<ContactRecord> = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Moneybird contacts: {}", e))
        })?;

        tracing::debug!("Moneybird: {} contacts match {}", contacts.len(), query);
        Ok(contacts)
    }

    pub async fn create_contact(&self, contact: &NewContact) -> Result<ContactRecord, AppError> {
        let body = json!({ "contact": contact });

        let response = self
            .client
            .post(self.endpoint("contacts.json"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Moneybird contact: {}", e))
            })?;

        let response = error_for_status(response, "Moneybird contact creation").await?;

        let created: ContactRecord = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!(
                "Failed to parse contact creation response: {}",
                e
            ))
        })?;

        Ok(created)
    }

    /// Looks for an external sales invoice on `contact_id` carrying `reference`.
    ///
    /// Walks the contact's invoices page by page until the reference is found
    /// or a short page marks the end of the list.
    pub async fn find_external_sales_invoice(
        &self,
        contact_id: &str,
        reference: &str,
    ) -> Result<Option<ExternalSalesInvoice>, AppError> {
        let filter = format!("contact_id:{}", contact_id);
        let per_page = INVOICES_PER_PAGE.to_string();

        for page in 1u32.. {
            let page_param = page.to_string();
            let url = reqwest::Url::parse_with_params(
                &self.endpoint("external_sales_invoices.json"),
                &[
                    ("filter", filter.as_str()),
                    ("per_page", per_page.as_str()),
                    ("page", page_param.as_str()),
                ],
            )
            .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

            let response = self
                .client
                .get(url)
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|e| {
                    AppError::ExternalApiError(format!("Moneybird invoice lookup failed: {}", e))
                })?;

            let response = error_for_status(response, "Moneybird invoice lookup").await?;

            let invoices: Vec<ExternalSalesInvoice> = response.json().await.map_err(|e| {
                AppError::ExternalApiError(format!("Failed to parse Moneybird invoices: {}", e))
            })?;

            tracing::debug!(
                "Moneybird: {} invoices on page {} for contact {}",
                invoices.len(),
                page,
                contact_id
            );

            let last_page = invoices.len() < INVOICES_PER_PAGE;
            if let Some(found) = invoices
                .into_iter()
                .find(|inv| inv.reference.as_deref() == Some(reference))
            {
                return Ok(Some(found));
            }
            if last_page {
                break;
            }
        }

        Ok(None)
    }

    pub async fn create_external_sales_invoice(
        &self,
        invoice: &NewExternalSalesInvoice,
    ) -> Result<ExternalSalesInvoice, AppError> {
        let body = json!({ "external_sales_invoice": invoice });

        let response = self
            .client
            .post(self.endpoint("external_sales_invoices.json"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to upload invoice: {}", e))
            })?;

        let response = error_for_status(response, "Moneybird invoice creation").await?;

        let created: ExternalSalesInvoice = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!(
                "Failed to parse invoice creation response: {}",
                e
            ))
        })?;

        tracing::info!(
            "✓ Uploaded to Moneybird: External Sales Invoice ID {}",
            created.id
        );
        Ok(created)
    }
}
