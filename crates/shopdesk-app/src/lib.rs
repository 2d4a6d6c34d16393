// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod checkout;
pub mod dashboard;
pub mod dates;
pub mod export;
pub mod forms;
pub mod ids;
pub mod model;
pub mod page;
pub mod query;
pub mod rows;
pub mod state;

pub use ids::*;
pub use model::*;
pub use page::{PageEnvelope, normalize_page, unwrap_data};
pub use query::{from_server_page, to_server_page};
pub use state::*;
