mod helpers;

pub use helpers::{format_bogota, local_reply_id, now_iso, parse_timestamp};
