//! Event emission utilities for build operations

use crate::context::BuildContext;
use kiln_events::Event;

/// Send event if context has an event sender
pub(crate) fn send_event(context: &BuildContext, event: Event) {
    kiln_events::send_event(context.event_sender.as_ref(), event);
}
