//! Limiter Integration Tests

use agent_orchestrator::services::limiter::{AgentResourceLimiter, ResourceLimits};

#[test]
fn test_limit_two_scenario() {
    let mut limiter = AgentResourceLimiter::new();
    limiter.set_limits(ResourceLimits {
        max_concurrent_agents: 2,
    });
    limiter.record_launch("a");
    limiter.record_launch("b");
    assert!(!limiter.can_launch_agent(1));

    limiter.record_completion("a");
    assert!(limiter.can_launch_agent(1));
}

#[test]
fn test_count_matches_distinct_active_ids() {
    let mut limiter = AgentResourceLimiter::new();
    let ops = [
        ("launch", "a"),
        ("launch", "b"),
        ("launch", "a"),
        ("complete", "c"),
        ("complete", "a"),
        ("complete", "a"),
        ("launch", "c"),
    ];
    let mut active = std::collections::HashSet::new();
    for (op, id) in ops {
        if op == "launch" {
            limiter.record_launch(id);
            active.insert(id);
        } else {
            limiter.record_completion(id);
            active.remove(id);
        }
        assert_eq!(limiter.get_current_count() as usize, active.len());
    }
}

#[test]
fn test_stats_and_refusal_reason() {
    let mut limiter = AgentResourceLimiter::with_limits(ResourceLimits {
        max_concurrent_agents: 4,
    });
    limiter.record_launch("a");
    let stats = limiter.get_stats();
    assert_eq!(stats.available_slots, 3);
    assert_eq!(stats.utilization, 0.25);

    for id in ["b", "c", "d"] {
        limiter.record_launch(id);
    }
    let validation = limiter.validate_launch("e");
    assert!(!validation.can_launch);
    let reason = validation.reason.unwrap();
    assert!(reason.contains('4'));
}
