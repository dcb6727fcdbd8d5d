//! Larger test suites, kept out of the implementation files.

mod interpreter_tests;
