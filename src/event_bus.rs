/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Registered event handlers and their dispatch.
//!
//! Handlers are fired synchronously on the thread that completed the action, right after it
//! completed.

use crate::events::*;
use crate::logging::Logger;

pub(crate) type HandlerPtr<T> = Box<dyn Fn(&T) + Send>;

#[derive(Default)]
pub(crate) struct EventHandlers {
    pub(crate) insert_state_handlers: Vec<HandlerPtr<InsertStateEvent>>,
    pub(crate) reject_state_handlers: Vec<HandlerPtr<RejectStateEvent>>,
    pub(crate) query_handlers: Vec<HandlerPtr<QueryEvent>>,
    pub(crate) define_handlers: Vec<HandlerPtr<DefineEvent>>,
}

impl EventHandlers {
    /// Create the handler set, including the default loggers if `log_events` is set.
    pub(crate) fn new(log_events: bool) -> EventHandlers {
        let mut handlers = EventHandlers::default();
        if log_events {
            handlers
                .insert_state_handlers
                .push(InsertStateEvent::get_logger());
            handlers
                .reject_state_handlers
                .push(RejectStateEvent::get_logger());
            handlers.query_handlers.push(QueryEvent::get_logger());
            handlers.define_handlers.push(DefineEvent::get_logger());
        }
        handlers
    }

    pub(crate) fn fire_handlers(&self, event: Event) {
        match event {
            Event::InsertState(insert_state_event) => self
                .insert_state_handlers
                .iter()
                .for_each(|handler| handler(&insert_state_event)),

            Event::RejectState(reject_state_event) => self
                .reject_state_handlers
                .iter()
                .for_each(|handler| handler(&reject_state_event)),

            Event::Query(query_event) => self
                .query_handlers
                .iter()
                .for_each(|handler| handler(&query_event)),

            Event::Define(define_event) => self
                .define_handlers
                .iter()
                .for_each(|handler| handler(&define_event)),
        }
    }
}
