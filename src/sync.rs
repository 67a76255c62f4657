//! One incremental Stripe → Moneybird synchronization run.
//!
//! 1. Load the cursor and fetch payments created at or after it
//! 2. Resolve each payment's customer to a Moneybird contact
//! 3. Upload an external sales invoice unless one already references the payment
//! 4. Checkpoint the cursor once every payment of a creation second is handled

use crate::config::Config;
use crate::contacts::ContactResolver;
use crate::cursor::CursorStore;
use crate::errors::{AppError, ResultExt};
use crate::invoices::build_invoice;
use crate::models::Payment;
use crate::moneybird_client::MoneybirdClient;
use crate::stripe_client::StripeClient;

/// Counters for one run, logged when it finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub cursor_before: i64,
    /// Equal to `cursor_before` when nothing was checkpointed.
    pub cursor_after: i64,
    pub fetched: usize,
    pub uploaded: usize,
    pub already_uploaded: usize,
    pub skipped: usize,
    pub contacts_created: usize,
    pub contacts_reused: usize,
    pub truncated: bool,
}

/// What happened to a single payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Uploaded { contact_created: bool },
    AlreadyUploaded { contact_created: bool },
    Skipped,
}

pub struct SyncJob {
    config: Config,
    stripe: StripeClient,
    moneybird: MoneybirdClient,
    cursor: CursorStore,
}

impl SyncJob {
    pub fn new(
        config: Config,
        stripe: StripeClient,
        moneybird: MoneybirdClient,
        cursor: CursorStore,
    ) -> Self {
        Self {
            config,
            stripe,
            moneybird,
            cursor,
        }
    }

    /// Builds clients and cursor store from configuration.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let stripe = StripeClient::new(
            config.stripe_base_url.clone(),
            config.stripe_secret_key.clone(),
            config.http_timeout,
        )?;
        let moneybird = MoneybirdClient::new(
            config.moneybird_base_url.clone(),
            config.moneybird_administration_id.clone(),
            config.moneybird_api_token.clone(),
            config.http_timeout,
        )?;
        let cursor = CursorStore::new(config.cursor_file.clone());

        Ok(Self::new(config, stripe, moneybird, cursor))
    }

    /// Runs one sync pass.
    ///
    /// Any API or cursor failure aborts the pass. The cursor then stays at the
    /// last fully handled creation second, so the failing payment is retried
    /// by the next run. A truncated batch is processed but never moves the
    /// cursor.
    pub async fn run(&self) -> Result<SyncReport, AppError> {
        let cursor_before = self.cursor.load().await?;
        let mut report = SyncReport {
            cursor_before,
            cursor_after: cursor_before,
            ..Default::default()
        };

        tracing::info!("Fetching Stripe payments since {}...", cursor_before);
        let batch = self
            .stripe
            .list_payments_since(
                cursor_before,
                self.config.payments_limit,
                self.config.stripe_max_pages,
            )
            .await
            .context("Failed to fetch Stripe payments")?;

        report.fetched = batch.payments.len();
        report.truncated = batch.truncated;

        if batch.payments.is_empty() {
            tracing::info!("No new payments to upload.");
            return Ok(report);
        }

        // Unfetched payments of a truncated batch are older than everything
        // fetched, so the cursor must not move past any of them.
        let may_advance = !batch.truncated;
        let payments = ordered(batch.payments);
        let resolver = ContactResolver::new(self.moneybird.clone());

        for (index, payment) in payments.iter().enumerate() {
            let outcome = self
                .process_payment(&resolver, payment)
                .await
                .with_context(|| format!("Failed to sync payment {}", payment.id))?;

            match outcome {
                Outcome::Uploaded { contact_created } => {
                    report.uploaded += 1;
                    count_contact(&mut report, contact_created);
                }
                Outcome::AlreadyUploaded { contact_created } => {
                    report.already_uploaded += 1;
                    count_contact(&mut report, contact_created);
                }
                Outcome::Skipped => report.skipped += 1,
            }

            let second_done = payments
                .get(index + 1)
                .map_or(true, |next| next.created != payment.created);
            if second_done && may_advance {
                let next_cursor = payment.created + 1;
                if next_cursor > report.cursor_after {
                    self.cursor.store(next_cursor).await?;
                    report.cursor_after = next_cursor;
                }
            }
        }

        if !may_advance {
            tracing::warn!(
                "Batch truncated: cursor kept at {} so older payments are fetched again next run; raise STRIPE_MAX_PAGES if this repeats",
                report.cursor_after
            );
        }

        tracing::info!(
            "Sync finished: fetched={} uploaded={} already_uploaded={} skipped={} contacts_created={} contacts_reused={} cursor {} -> {}",
            report.fetched,
            report.uploaded,
            report.already_uploaded,
            report.skipped,
            report.contacts_created,
            report.contacts_reused,
            report.cursor_before,
            report.cursor_after
        );
        Ok(report)
    }

    async fn process_payment(
        &self,
        resolver: &ContactResolver,
        payment: &Payment,
    ) -> Result<Outcome, AppError> {
        let customer_id = match payment.customer.as_deref() {
            Some(id) => id,
            None => {
                tracing::warn!(
                    "Payment {} has no associated customer. Skipping.",
                    payment.id
                );
                return Ok(Outcome::Skipped);
            }
        };

        let customer = match self.stripe.get_customer(customer_id).await? {
            Some(customer) => customer,
            None => {
                tracing::warn!("No customer found for payment {}. Skipping.", payment.id);
                return Ok(Outcome::Skipped);
            }
        };

        tracing::info!(
            "Processing customer {}...",
            customer.email.as_deref().unwrap_or(&customer.id)
        );

        let resolution = match resolver.resolve(&customer).await? {
            Some(resolution) => resolution,
            None => {
                tracing::warn!(
                    "Customer {} of payment {} cannot be matched. Skipping.",
                    customer.id,
                    payment.id
                );
                return Ok(Outcome::Skipped);
            }
        };

        if let Some(existing) = self
            .moneybird
            .find_external_sales_invoice(&resolution.contact_id, &payment.id)
            .await?
        {
            tracing::info!(
                "Payment {} already uploaded to Moneybird as {}. Skipping upload.",
                payment.id,
                existing.id
            );
            return Ok(Outcome::AlreadyUploaded {
                contact_created: resolution.created,
            });
        }

        tracing::info!(
            "Uploading payment {} ({} {}) to Moneybird...",
            payment.id,
            payment.amount,
            payment.currency.as_deref().unwrap_or("?")
        );
        let invoice = build_invoice(
            payment,
            &resolution.contact_id,
            &self.config.moneybird_tax_rate_id,
        )?;
        self.moneybird.create_external_sales_invoice(&invoice).await?;

        Ok(Outcome::Uploaded {
            contact_created: resolution.created,
        })
    }
}

fn count_contact(report: &mut SyncReport, created: bool) {
    if created {
        report.contacts_created += 1;
    } else {
        report.contacts_reused += 1;
    }
}

/// Oldest first, ties broken by id, so checkpoints only ever move forward.
fn ordered(mut payments: Vec<Payment>) -> Vec<Payment> {
    payments.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
    payments.dedup_by(|a, b| a.id == b.id);
    payments
}
