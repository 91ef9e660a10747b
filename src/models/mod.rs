pub mod history;
pub mod scan;
pub mod state;
