//! Background processing of weather requests.
//!
//! [`queue::JobQueue`] carries record IDs from the web layer to the
//! [`queue::Dispatcher`], which runs one [`processor::RequestProcessor`] task
//! per ID with bounded concurrency. The standalone binary adds
//! [`poller`], which feeds the queue from the database.

pub mod config;
pub mod poller;
pub mod processor;
pub mod queue;
pub mod shutdown;
