mod backoff;

pub use backoff::RetryPolicy;
