//! End-to-end tests across host, publisher and subscriber.

mod pipeline;
