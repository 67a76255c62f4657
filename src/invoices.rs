use crate::errors::AppError;
use crate::models::{InvoiceDetail, NewExternalSalesInvoice, Payment};
use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use chrono::DateTime;

pub const INVOICE_SOURCE: &str = "Stripe";

/// UTC calendar date of a unix timestamp, as `YYYY-MM-DD`.
///
/// `None` when the timestamp is outside the representable date range.
pub fn document_date(created: i64) -> Option<String> {
    DateTime::from_timestamp(created, 0).map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}

/// Converts minor units (cents) into an exact two-decimal amount.
pub fn price_from_minor_units(amount: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(amount), 2)
}

pub fn payment_description(payment: &Payment) -> String {
    payment
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Stripe Payment {}", payment.id))
}

/// Builds the external sales invoice for one payment.
///
/// The payment id becomes the invoice reference, which is what the sync
/// uses to detect invoices uploaded by an earlier run.
pub fn build_invoice(
    payment: &Payment,
    contact_id: &str,
    tax_rate_id: &str,
) -> Result<NewExternalSalesInvoice, AppError> {
    let document_date = document_date(payment.created).ok_or_else(|| {
        AppError::InvalidPayment(format!(
            "{} has an out-of-range creation time {}",
            payment.id, payment.created
        ))
    })?;
    let description = payment_description(payment);

    Ok(NewExternalSalesInvoice {
        contact_id: contact_id.to_string(),
        document_date,
        reference: payment.id.clone(),
        description: description.clone(),
        source: INVOICE_SOURCE.to_string(),
        source_url: format!("https://dashboard.stripe.com/payments/{}", payment.id),
        details_attributes: vec![InvoiceDetail {
            description,
            price: price_from_minor_units(payment.amount).to_string(),
            amount: "1".to_string(),
            tax_rate_id: tax_rate_id.to_string(),
        }],
    })
}
