pub mod aggregator;
pub mod clock;
pub mod due_date;
pub mod errors;
pub mod services;
