//! Durable log tests

mod writer_tests;
