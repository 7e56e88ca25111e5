use ahash::AHashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// System-wide event bus
///
/// Sessions publish here and never reach into each other's state; the app
/// subscribes to forward published values (scanned start location, failure
/// notices) to whoever displays or stores them.
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Session events
pub mod events {
    use super::Event;
    use crate::model::OccupancyStatus;

    /// The node directory snapshot finished loading
    #[derive(Debug, Clone)]
    pub struct DirectoryLoaded {
        pub node_count: usize,
    }

    /// The node directory could not be fetched
    #[derive(Debug, Clone)]
    pub struct DirectoryFailed {
        pub message: String,
    }

    /// A route was computed and stored
    #[derive(Debug, Clone)]
    pub struct RouteLoaded {
        pub start: String,
        pub end: String,
        /// Floor the view switched to (the start node's floor).
        pub floor: u32,
    }

    /// A route request failed; prior session state is untouched
    #[derive(Debug, Clone)]
    pub struct RouteFailed {
        pub message: String,
    }

    /// Destination occupancy was settled (best-effort)
    #[derive(Debug, Clone)]
    pub struct OccupancySettled {
        pub room: String,
        pub status: OccupancyStatus,
    }

    /// A QR capture session accepted a decode
    #[derive(Debug, Clone)]
    pub struct ScanCaptured {
        pub value: String,
    }

    // Implement Event trait for all event types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        DirectoryLoaded,
        DirectoryFailed,
        RouteLoaded,
        RouteFailed,
        OccupancySettled,
        ScanCaptured
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::events::RouteFailed;
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn publish_reaches_subscribers_of_the_event_type() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<RouteFailed>(handler_from_fn(move |event| {
            if let Some(e) = event.as_any().downcast_ref::<RouteFailed>() {
                sink.lock().push(e.message.clone());
            }
        }));

        bus.publish(RouteFailed {
            message: "no path".to_string(),
        });
        bus.publish(super::events::DirectoryLoaded { node_count: 3 });

        assert_eq!(seen.lock().as_slice(), ["no path"]);
    }
}
