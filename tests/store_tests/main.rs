//! Store tests: replay, compaction, snapshot export

mod snapshot_tests;
