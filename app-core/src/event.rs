use std::collections::VecDeque;

use log::{debug, error};

/// Whether an event is done or has to be applied again in the next
/// iteration of the GUI event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventState {
    Finished,
    Busy,
}

/// Something that wants to modify the application state.
///
/// Events are queued from within UI code and applied later, once the UI
/// code no longer borrows parts of the application.
pub trait AppEvent {
    type App;
    fn apply(&mut self, app: &mut Self::App) -> Result<EventState, String>;
    fn describe(&self) -> &str {
        "unnamed event"
    }
}

/// The EventQueue stores events that are processed each iteration
/// of the application GUI event loop, in the order they were queued.
pub struct EventQueue<A> {
    /// Stores events for later processing.
    queue: VecDeque<Box<dyn AppEvent<App = A>>>,
    /// Temporarily stores events that have not yet finished running.
    tmp_backlog: Vec<Box<dyn AppEvent<App = A>>>,
}

impl<A> Default for EventQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> EventQueue<A> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            tmp_backlog: Vec::new(),
        }
    }

    pub fn queue_event(&mut self, event: Box<dyn AppEvent<App = A>>) {
        debug!("queueing event '{}'", event.describe());
        self.queue.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.queue.len() + self.tmp_backlog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_event(&mut self) -> Option<Box<dyn AppEvent<App = A>>> {
        self.queue.pop_front()
    }

    fn postpone(&mut self, event: Box<dyn AppEvent<App = A>>) {
        self.tmp_backlog.push(event);
    }

    fn end_cycle(&mut self) {
        // Busy events go first next time, they were queued earlier than
        // anything that arrives from now on.
        let backlog = std::mem::take(&mut self.tmp_backlog);
        for event in backlog.into_iter().rev() {
            self.queue.push_front(event);
        }
    }
}

/// Implemented by applications that own an `EventQueue` of events
/// targeting themselves.
pub trait HasEventQueue: Sized {
    fn event_queue(&mut self) -> &mut EventQueue<Self>;
}

/// Fully drain the queue of `app`, applying every event to `app`.
///
/// Each event is popped before it is applied, so events can borrow the
/// whole application mutably (and even queue further events). Busy events
/// are kept for the next call. Returns `true` if any event finished or
/// failed, i.e. if the application state may have changed.
pub fn run_events<A: HasEventQueue>(app: &mut A) -> bool {
    let mut changed = false;
    while let Some(mut event) = app.event_queue().next_event() {
        match event.apply(app) {
            Ok(EventState::Finished) => {
                changed = true;
            }
            Ok(EventState::Busy) => {
                app.event_queue().postpone(event);
            }
            Err(err) => {
                error!("event '{}' failed: {}", event.describe(), err);
                changed = true;
            }
        }
    }
    app.event_queue().end_cycle();
    changed
}
