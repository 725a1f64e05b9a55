use std::sync::Arc;

/// Result of one handler in a composition chain. A cancelled outcome stops
/// the chain before any later handler runs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HandlerOutcome {
    pub cancelled: bool,
}

impl HandlerOutcome {
    pub fn proceed() -> Self {
        Self { cancelled: false }
    }

    pub fn cancel() -> Self {
        Self { cancelled: true }
    }
}

pub type EventHandler<S> = Arc<dyn Fn(&S) -> HandlerOutcome + Send + Sync>;

/// Combines handlers into one, invoking each non-empty slot in order with the
/// same signal. The controller's own handler always sits last, so a caller
/// handler that cancels suppresses the controller's default reaction.
pub fn compose<S: 'static>(handlers: Vec<Option<EventHandler<S>>>) -> EventHandler<S> {
    Arc::new(move |signal| {
        for handler in handlers.iter().flatten() {
            if handler(signal).cancelled {
                return HandlerOutcome::cancel();
            }
        }
        HandlerOutcome::proceed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> EventHandler<()> {
        let log = log.clone();
        Arc::new(move |_| {
            log.lock().expect("log lock").push(tag);
            HandlerOutcome::proceed()
        })
    }

    #[test]
    fn handlers_run_in_order_and_skip_empty_slots() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let composed = compose(vec![
            Some(recorder(&log, "first")),
            None,
            Some(recorder(&log, "second")),
        ]);

        let outcome = composed(&());
        assert!(!outcome.cancelled);
        assert_eq!(*log.lock().expect("log lock"), vec!["first", "second"]);
    }

    #[test]
    fn cancellation_stops_the_chain_immediately() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let cancelling: EventHandler<()> = {
            let log = log.clone();
            Arc::new(move |_| {
                log.lock().expect("log lock").push("cancelling");
                HandlerOutcome::cancel()
            })
        };
        let composed = compose(vec![Some(cancelling), Some(recorder(&log, "skipped"))]);

        let outcome = composed(&());
        assert!(outcome.cancelled);
        assert_eq!(*log.lock().expect("log lock"), vec!["cancelling"]);
    }
}
