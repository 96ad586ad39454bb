//! Tests for the verification session

#[cfg(test)]
mod countdown_tests;
#[cfg(test)]
mod session_tests;
