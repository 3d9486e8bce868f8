#[cfg(unix)]
mod orchestrator;
