use super::worker::GCWorker;

/// A unit of collection work. Packets run one at a time, and only see the heap and the
/// stack through the worker.
pub trait GCWork {
    fn do_work(&mut self, worker: &mut GCWorker);

    /// The name shown in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("GCWork")
    }
}
