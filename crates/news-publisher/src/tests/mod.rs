//! Publisher integration tests over real sockets.

mod harness;
