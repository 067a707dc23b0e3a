mod best_effort_path_ext;
mod quote_ext;

pub use best_effort_path_ext::BestEffortPathExt;
pub use quote_ext::{QuoteExt, quoted_list};
