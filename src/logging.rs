/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out events.
//!
//! The logs defined in this module are printed if the user enabled them via the repository's
//! [configuration](crate::config::Configuration).
//!
//! Events are logged using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
//! printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values are
//! always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following snippet
//! is how an [InsertState](crate::events::InsertStateEvent) is printed:
//!
//! ```text
//! InsertState, 1701329264, Id5u7f6, Alice, 2, 1
//! ```
//!
//! In the snippet:
//! - The third value is the first seven characters of the Base64 encoding of the node id.
//! - The fourth value is the author of the node.
//! - The fifth and sixth values are its number of dependencies and attached policies.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use std::time::SystemTime;

use crate::events::*;

// Names of each event in PascalCase for printing:
pub const INSERT_STATE: &str = "InsertState";
pub const REJECT_STATE: &str = "RejectState";
pub const QUERY: &str = "Query";
pub const DEFINE: &str = "Define";

/// Implemented by event types. Used to get a closure that logs the event.
pub(crate) trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send>;
}

impl Logger for InsertStateEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |insert_state_event: &InsertStateEvent| {
            log::info!(
                "{}, {}, {}, {}, {}, {}",
                INSERT_STATE,
                secs_since_unix_epoch(insert_state_event.timestamp),
                first_seven_base64_chars(&insert_state_event.node.bytes()),
                insert_state_event.author,
                insert_state_event.dependencies,
                insert_state_event.policies
            )
        };
        Box::new(logger)
    }
}

impl Logger for RejectStateEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |reject_state_event: &RejectStateEvent| {
            log::warn!(
                "{}, {}, {}, {}, {}",
                REJECT_STATE,
                secs_since_unix_epoch(reject_state_event.timestamp),
                reject_state_event.subject,
                first_seven_base64_chars(&reject_state_event.owner.bytes()),
                reject_state_event.policy
            )
        };
        Box::new(logger)
    }
}

impl Logger for QueryEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |query_event: &QueryEvent| {
            log::info!(
                "{}, {}, {}, {}, {}, {}",
                QUERY,
                secs_since_unix_epoch(query_event.timestamp),
                query_event.subject,
                first_seven_base64_chars(&query_event.node.bytes()),
                query_event.satisfied,
                query_event.formula
            )
        };
        Box::new(logger)
    }
}

impl Logger for DefineEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |define_event: &DefineEvent| {
            log::info!(
                "{}, {}, {}, {}",
                DEFINE,
                secs_since_unix_epoch(define_event.timestamp),
                define_event.name,
                define_event.reference
            )
        };
        Box::new(logger)
    }
}

// Get a more readable representation of a bytesequence by base64-encoding it and taking the first 7 characters.
pub(crate) fn first_seven_base64_chars(bytes: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(bytes);
    if encoded.len() > 7 {
        encoded[0..7].to_string()
    } else {
        encoded
    }
}

pub(crate) fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}
