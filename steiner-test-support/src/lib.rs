//! Shared test utilities used across steiner crates.

pub mod tracing {
    //! A recording layer that captures spans and events for assertions.
    use std::{
        collections::HashMap,
        fmt,
        sync::{Arc, Mutex, MutexGuard},
    };

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        span::{Attributes, Id, Record},
    };
    use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

    /// Layer that keeps every closed span and every event in memory.
    ///
    /// Clones share the same storage, so a test can install one clone in a
    /// subscriber and inspect another afterwards.
    ///
    /// # Examples
    /// ```
    /// use steiner_test_support::tracing::RecordingLayer;
    /// use tracing_subscriber::layer::SubscriberExt;
    ///
    /// let layer = RecordingLayer::default();
    /// let subscriber = tracing_subscriber::registry().with(layer.clone());
    /// tracing::subscriber::with_default(subscriber, || {
    ///     let _span = tracing::info_span!("phase", step = 1).entered();
    ///     tracing::info!(answer = 42, "done");
    /// });
    ///
    /// let step = layer
    ///     .span_named("phase")
    ///     .and_then(|span| span.field("step").map(str::to_owned));
    /// assert_eq!(step.as_deref(), Some("1"));
    /// assert_eq!(layer.events_with_message("done").len(), 1);
    /// ```
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        store: Arc<Mutex<Recorded>>,
    }

    #[derive(Default)]
    struct Recorded {
        spans: Vec<SpanRecord>,
        events: Vec<EventRecord>,
    }

    impl RecordingLayer {
        fn store(&self) -> MutexGuard<'_, Recorded> {
            // Keep recording after a test thread panicked.
            self.store
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }

        /// Closed spans in completion order.
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.store().spans.clone()
        }

        /// Events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.store().events.clone()
        }

        /// First closed span called `name`.
        #[must_use]
        pub fn span_named(&self, name: &str) -> Option<SpanRecord> {
            self.store()
                .spans
                .iter()
                .find(|span| span.name == name)
                .cloned()
        }

        /// Events whose `message` field equals `message`.
        #[must_use]
        pub fn events_with_message(&self, message: &str) -> Vec<EventRecord> {
            self.store()
                .events
                .iter()
                .filter(|event| event.field("message") == Some(message))
                .cloned()
                .collect()
        }
    }

    /// A closed span with the fields recorded while it was open.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from its metadata.
        pub name: String,
        /// Name of the enclosing span, if any.
        pub parent: Option<String>,
        /// Recorded fields rendered as strings.
        pub fields: HashMap<String, String>,
    }

    impl SpanRecord {
        /// Value of field `name`, if recorded.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    /// An emitted event.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target, usually the emitting module path.
        pub target: String,
        /// Name of the span the event was emitted in, if any.
        pub span: Option<String>,
        /// Recorded fields rendered as strings, `message` included.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// Value of field `name`, if recorded.
        #[must_use]
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields.get(name).map(String::as_str)
        }
    }

    struct OpenSpan {
        name: String,
        parent: Option<String>,
        fields: HashMap<String, String>,
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut fields = HashMap::new();
            attrs.record(&mut Fields(&mut fields));
            let parent = span.parent().map(|parent| parent.name().to_owned());
            span.extensions_mut().insert(OpenSpan {
                name: attrs.metadata().name().to_owned(),
                parent,
                fields,
            });
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut extensions = span.extensions_mut();
            if let Some(open) = extensions.get_mut::<OpenSpan>() {
                values.record(&mut Fields(&mut open.fields));
            }
        }

        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut Fields(&mut fields));
            let span = ctx.event_span(event).map(|span| span.name().to_owned());
            self.store().events.push(EventRecord {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                span,
                fields,
            });
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let Some(open) = span.extensions_mut().remove::<OpenSpan>() else {
                return;
            };
            self.store().spans.push(SpanRecord {
                name: open.name,
                parent: open.parent,
                fields: open.fields,
            });
        }
    }

    struct Fields<'a>(&'a mut HashMap<String, String>);

    impl Fields<'_> {
        fn put(&mut self, field: &Field, value: String) {
            self.0.insert(field.name().to_owned(), value);
        }
    }

    impl Visit for Fields<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.put(field, format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.put(field, value.to_owned());
        }

        fn record_f64(&mut self, field: &Field, value: f64) {
            self.put(field, value.to_string());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.put(field, value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.put(field, value.to_string());
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.put(field, value.to_string());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.put(field, value.to_string());
        }
    }
}

pub mod ci;
