pub mod discovery;
pub mod value;

pub use discovery::{format_discovery, validate_lld, DiscoveryDocument, MacroMap};
pub use value::{
    calculate_email_usage_percent, create_item_key, format_item_value, sanitize_value, ValueKind,
};
