#[cfg(feature = "integration-tests")]
mod live_test;
mod test_utils;
