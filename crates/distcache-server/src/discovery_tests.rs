use super::*;

#[test]
fn new_node_is_alive_from_the_start() {
    let d = Discovery::new("n1".to_string(), Duration::from_millis(50), Duration::from_millis(500));
    assert!(d.is_node_alive("n1"));
}

#[test]
fn unknown_node_is_not_alive() {
    let d = Discovery::new("n1".to_string(), Duration::from_millis(50), Duration::from_millis(500));
    assert!(!d.is_node_alive("ghost"));
}

#[test]
fn seed_nodes_start_alive() {
    let d = Discovery::new("n1".to_string(), Duration::from_millis(50), Duration::from_millis(500));
    d.add_seed_node("n2".to_string());
    assert!(d.is_node_alive("n2"));

    let alive: Vec<_> = d.get_alive_nodes().into_iter().map(|n| n.node_id).collect();
    assert!(alive.contains(&"n1".to_string()));
    assert!(alive.contains(&"n2".to_string()));
}

#[test]
fn stale_seed_is_marked_dead_after_timeout() {
    let d = Discovery::new(
        "n1".to_string(),
        Duration::from_millis(5),
        Duration::from_millis(10),
    );
    d.add_seed_node("n2".to_string());
    std::thread::sleep(Duration::from_millis(20));

    d.broadcast_heartbeat();

    assert!(!d.is_node_alive("n2"));
    assert!(d.is_node_alive("n1"), "broadcasting node refreshes its own heartbeat");
}

#[test]
fn recording_a_heartbeat_revives_a_stale_node() {
    let d = Discovery::new(
        "n1".to_string(),
        Duration::from_millis(5),
        Duration::from_millis(10),
    );
    d.add_seed_node("n2".to_string());
    std::thread::sleep(Duration::from_millis(20));
    d.broadcast_heartbeat();
    assert!(!d.is_node_alive("n2"));

    d.record_heartbeat("n2");
    assert!(d.is_node_alive("n2"));
}
