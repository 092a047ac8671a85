//! Event factories
//!
//! A factory pre-populates every ring buffer slot exactly once at
//! construction so the steady state never allocates.

/// Factory invoked once per slot during ring buffer construction
pub trait EventFactory<T>: Send + Sync {
    /// Create one event in its initial state.
    fn new_instance(&self) -> T;
}

/// Factory for event types that implement `Default`
pub struct DefaultEventFactory<T: Default> {
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T: Default> DefaultEventFactory<T> {
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: Default> Default for DefaultEventFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + Send + Sync> EventFactory<T> for DefaultEventFactory<T> {
    fn new_instance(&self) -> T {
        T::default()
    }
}

/// Factory backed by a nullary closure
pub struct ClosureEventFactory<T, F>
where
    F: Fn() -> T + Send + Sync,
{
    factory_fn: F,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T, F> ClosureEventFactory<T, F>
where
    F: Fn() -> T + Send + Sync,
{
    pub fn new(factory_fn: F) -> Self {
        Self {
            factory_fn,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, F> EventFactory<T> for ClosureEventFactory<T, F>
where
    T: Send + Sync,
    F: Fn() -> T + Send + Sync,
{
    fn new_instance(&self) -> T {
        (self.factory_fn)()
    }
}

/// Shorthand for [`ClosureEventFactory::new`].
pub fn event_factory<T, F>(factory_fn: F) -> ClosureEventFactory<T, F>
where
    F: Fn() -> T + Send + Sync,
{
    ClosureEventFactory::new(factory_fn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct TestEvent {
        value: i64,
    }

    #[test]
    fn test_default_event_factory() {
        let factory = DefaultEventFactory::<TestEvent>::new();
        assert_eq!(factory.new_instance(), TestEvent::default());
    }

    #[test]
    fn test_closure_event_factory() {
        let factory = ClosureEventFactory::new(|| TestEvent { value: 42 });
        assert_eq!(factory.new_instance().value, 42);
    }

    #[test]
    fn test_instances_are_independent() {
        let factory = event_factory(|| TestEvent { value: 0 });
        let mut first = factory.new_instance();
        let second = factory.new_instance();

        first.value = 9;
        assert_eq!(second.value, 0);
    }
}
