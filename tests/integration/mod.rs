//! Integration Tests Module
//!
//! End-to-end tests through the public API: streaming extraction,
//! concurrency limiting, agent launches and proposal commands.

// Tool call extraction and stream sessions
mod extractor_test;

// Concurrency limiter scenarios
mod limiter_test;

// Agent launch, cancellation and proposal handling
mod launch_test;

// Proposal, settings and extraction commands
mod proposal_test;
