pub mod convert_worker;
pub mod translate_worker;

/// Messages sent from a worker thread to the UI.
#[derive(Debug, Clone)]
pub enum WorkerMessage<T> {
    Complete(T),
    Error(String),
}
