pub mod cli;

pub use cli::TushareClient;
pub use tushare_model::*;
