use crate::errors::{error_for_status, AppError};
use crate::models::{Customer, Payment, PaymentBatch, StripeList};
use reqwest::StatusCode;
use std::time::Duration;

/// Read-only client for the Stripe REST API.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    /// Creates a new `StripeClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.stripe.com/v1`.
    /// * `secret_key` - Secret API key used as bearer token.
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: String, secret_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Stripe client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    /// Lists payment intents created at or after `since`.
    ///
    /// Stripe returns newest first. At most `max_pages` pages of `limit`
    /// payments are fetched; if more remain the batch is marked truncated.
    pub async fn list_payments_since(
        &self,
        since: i64,
        limit: u32,
        max_pages: u32,
    ) -> Result<PaymentBatch, AppError> {
        let mut batch = PaymentBatch::default();
        let mut starting_after: Option<String> = None;

        for page in 1..=max_pages.max(1) {
            let since_param = since.to_string();
            let limit_param = limit.to_string();
            let mut params = vec![
                ("created[gte]", since_param.as_str()),
                ("limit", limit_param.as_str()),
            ];
            if let Some(ref last) = starting_after {
                params.push(("starting_after", last.as_str()));
            }

            let url = reqwest::Url::parse_with_params(
                &format!("{}/payment_intents", self.base_url),
                &params,
            )
            .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

            tracing::info!("Fetching Stripe payments since {} (page {})", since, page);

            let response = self
                .client
                .get(url)
                .bearer_auth(&self.secret_key)
                .send()
                .await
                .map_err(|e| {
                    AppError::ExternalApiError(format!("Stripe payments request failed: {}", e))
                })?;

            let response = error_for_status(response, "Stripe payments list").await?;

            let list: StripeList<Payment> = response.json().await.map_err(|e| {
                AppError::ExternalApiError(format!("Failed to parse Stripe payments: {}", e))
            })?;

            tracing::debug!(
                "Stripe page {}: {} payments, has_more={}",
                page,
                list.data.len(),
                list.has_more
            );

            starting_after = list.data.last().map(|p| p.id.clone());
            batch.payments.extend(list.data);
            batch.truncated = list.has_more;

            if !list.has_more || starting_after.is_none() {
                break;
            }
        }

        if batch.truncated {
            tracing::warn!(
                "Stripe reported more payments since {} than fetched ({}); the cursor will not advance this run",
                since,
                batch.payments.len()
            );
        }

        tracing::info!("Fetched {} Stripe payments", batch.payments.len());
        Ok(batch)
    }

    /// Fetches a customer with its tax ids expanded.
    ///
    /// Returns `None` when the customer does not exist or has been deleted.
    pub async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>, AppError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/customers/{}", self.base_url, customer_id),
            &[("expand[]", "tax_ids")],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Fetching customer info for {}...", customer_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Stripe customer request failed: {}", e))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::warn!("Stripe customer {} not found", customer_id);
            return Ok(None);
        }

        let response = error_for_status(response, "Stripe customer").await?;

        let customer: Customer = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!(
                "Failed to parse Stripe customer {}: {}",
                customer_id, e
            ))
        })?;

        if customer.deleted {
            tracing::warn!("Stripe customer {} has been deleted", customer_id);
            return Ok(None);
        }

        Ok(Some(customer))
    }
}
