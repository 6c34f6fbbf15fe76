//! Shared utilities: overwrite parsing, lookup by name, log redaction.

pub mod lookup;
pub mod overwrite;
pub mod redact;

pub use lookup::{get_item_by_name, LookupError, Named};
pub use overwrite::{parse_overwrite, OverwriteError, Overwrites};
pub use redact::{hide_secrets, mask_passwords, redact};
