//! Integration tests for the news host.
//!
//! - `harness.rs`      - Mock publisher and test host
//! - `delivery.rs`     - Submission, forwarding and confirmation
//! - `availability.rs` - Publisher outages, rejections and timeouts
//! - `concurrency.rs`  - Racing submissions and id assignment
//! - `recovery.rs`     - Restart and reconciliation
//! - `dispatch.rs`     - Method dispatch, malformed input and proxying
//! - `storage.rs`      - Store failures during intake and forwarding
