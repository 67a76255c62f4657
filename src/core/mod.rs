// Domain-layer modules and shared errors/models
pub mod sync {
    pub use crate::sync::*;
}

pub mod contacts {
    pub use crate::contacts::*;
}

pub mod cursor {
    pub use crate::cursor::*;
}

pub mod invoices {
    pub use crate::invoices::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
