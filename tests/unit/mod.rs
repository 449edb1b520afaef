pub mod matcher_tests;
