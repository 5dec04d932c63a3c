/// A domain-agnostic event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **tagged** with a stable type name (e.g. "product.created")
/// - **scoped** to the aggregate that recorded them
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier.
    fn event_type(&self) -> &'static str;

    /// Identifier of the aggregate the event originated from.
    fn aggregate_id(&self) -> String;
}
