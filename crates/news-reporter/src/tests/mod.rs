//! Reporter tests against a scripted host.

mod submission;
