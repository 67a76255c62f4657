/// Property-based tests using proptest
/// Tests invariants of the pure mapping and cursor helpers
use proptest::prelude::*;
use stripe_moneybird_sync::contacts::NaturalKey;
use stripe_moneybird_sync::cursor::parse_cursor;
use stripe_moneybird_sync::invoices::{document_date, price_from_minor_units};
use stripe_moneybird_sync::models::{ContactRecord, NewContact};

// Property: cursor parsing never panics and accepts its own output
proptest! {
    #[test]
    fn cursor_parsing_never_panics(content in "\\PC*") {
        let _ = parse_cursor(&content);
    }

    #[test]
    fn written_cursor_parses_back(value in 0i64..=i64::MAX, pad in "[ \\t\\n]{0,3}") {
        let content = format!("{}{}{}", pad, value, pad);
        prop_assert_eq!(parse_cursor(&content), Ok(value));
    }
}

// Property: prices keep every cent
proptest! {
    #[test]
    fn price_has_two_decimals_and_same_digits(amount in 1i64..10_000_000_000i64) {
        let price = price_from_minor_units(amount).to_string();
        let (units, cents) = price.split_once('.').expect("two decimals");
        prop_assert_eq!(cents.len(), 2);
        prop_assert_eq!(units.parse::<i64>().unwrap() * 100 + cents.parse::<i64>().unwrap(), amount);
    }
}

// Property: document dates are well-formed calendar dates
proptest! {
    #[test]
    fn document_date_is_iso(created in 0i64..4_102_444_800i64) {
        let date = document_date(created).expect("in range");
        prop_assert!(chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok(), "{}", date);
    }
}

// Property: a contact always matches a record carrying the same key value
proptest! {
    #[test]
    fn key_matches_record_with_same_value(
        tax in proptest::option::of("[A-Z]{2}[0-9]{9}B0[0-9]"),
        email in proptest::option::of("[a-z]{1,8}@[a-z]{1,8}\\.nl"),
        name in proptest::option::of("[A-Za-z ]{1,20}")
    ) {
        let contact = NewContact {
            tax_number: tax.clone(),
            email: email.clone(),
            company_name: name.clone(),
            ..Default::default()
        };
        let record = ContactRecord {
            id: "1".to_string(),
            tax_number: tax,
            email,
            company_name: name,
            ..Default::default()
        };

        match NaturalKey::for_contact(&contact) {
            Some(key) => prop_assert!(key.matches(&record)),
            None => prop_assert!(contact.tax_number.is_none() && contact.email.is_none() && contact.company_name.is_none()),
        }
    }
}
