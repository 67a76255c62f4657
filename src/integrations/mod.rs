//! External service integrations.

pub mod stripe_client {
    pub use crate::stripe_client::*;
}

pub mod moneybird_client {
    pub use crate::moneybird_client::*;
}
