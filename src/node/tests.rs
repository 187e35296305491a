//! Service Node Module Tests
//!
//! ## Test Scopes
//! - **Routing Policy**: termination rules, peer exclusion, uniform choice, chain length.
//! - **Snapshot Cache**: wholesale replacement and stale-push rejection.
//! - **Lifecycle**: allowed and rejected transitions, registration failure.
//! - **Request Handling**: local answers, correlation propagation, forwarding over HTTP.

#[cfg(test)]
mod tests {
    use crate::config::NodeConfig;
    use crate::error::MeshError;
    use crate::node::cache::{ApplyOutcome, SnapshotCache};
    use crate::node::identity::{NodeIdentity, RANDOM_PORT_MAX, RANDOM_PORT_MIN, bind_listener};
    use crate::node::lifecycle::{Lifecycle, LifecycleState};
    use crate::node::protocol::{
        CorrelationToken, HEADER_CORRELATION_ID, HEADER_HOPS, HEADER_SERVED_BY, HELLO_BODY,
        hops_from_headers,
    };
    use crate::node::random::{RandomSource, SeededRandom};
    use crate::node::routing::{Decision, RoutingPolicy, TerminationReason};
    use crate::node::server::{NodeServer, router};
    use crate::node::service::ServiceNode;
    use crate::registry::types::Snapshot;
    use crate::shutdown::spawn_server;
    use axum::Router;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use axum::routing::get;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    /// Replays fixed draws; falls back to 0.99 / index 0 once exhausted.
    #[derive(Default)]
    struct ScriptedRandom {
        units: Mutex<VecDeque<f64>>,
        indices: Mutex<VecDeque<usize>>,
    }

    impl ScriptedRandom {
        fn new(units: &[f64], indices: &[usize]) -> Arc<Self> {
            Arc::new(Self {
                units: Mutex::new(units.iter().copied().collect()),
                indices: Mutex::new(indices.iter().copied().collect()),
            })
        }
    }

    impl RandomSource for ScriptedRandom {
        fn unit(&self) -> f64 {
            self.units.lock().pop_front().unwrap_or(0.99)
        }

        fn below(&self, upper: usize) -> usize {
            self.indices.lock().pop_front().unwrap_or(0) % upper
        }
    }

    fn snapshot(entries: &[(&str, &str)]) -> Snapshot {
        let mut snapshot = Snapshot::new("test");
        for (name, addr) in entries {
            snapshot
                .addr_by_name
                .insert(name.to_string(), addr.to_string());
        }
        snapshot
    }

    fn versioned(epoch: &str, version: u64, entries: &[(&str, &str)]) -> Snapshot {
        let mut s = snapshot(entries);
        s.epoch = epoch.to_string();
        s.version = version;
        s
    }

    fn node_config(name: &str, p: f64, max_hops: u32) -> NodeConfig {
        let mut config = NodeConfig::new(name);
        config.termination_probability = p;
        config.max_hops = max_hops;
        config.forward_timeout = Duration::from_secs(2);
        config.register_attempts = 1;
        config.register_timeout = Duration::from_millis(300);
        config
    }

    fn service_node(name: &str, addr: &str, p: f64, max_hops: u32) -> Arc<ServiceNode> {
        service_node_with(addr, &node_config(name, p, max_hops))
    }

    fn service_node_with(addr: &str, config: &NodeConfig) -> Arc<ServiceNode> {
        let identity = NodeIdentity {
            name: config.name.clone(),
            addr: addr.to_string(),
        };
        ServiceNode::new(identity, config, Arc::new(SeededRandom::new(1)))
    }

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        spawn_server(listener, app, std::future::pending());
        addr
    }

    /// Accepts connections and never answers on them.
    async fn stalled_addr() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    async fn dead_addr() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }

    // ============================================================
    // ROUTING POLICY TESTS
    // ============================================================

    #[test]
    fn test_only_self_always_answers_locally() {
        let policy = RoutingPolicy::new(0.0, 16, ScriptedRandom::new(&[], &[]));
        let snap = snapshot(&[("a", "h1")]);

        for _ in 0..100 {
            assert_eq!(
                policy.decide(&snap, "a", 0),
                Decision::Local(TerminationReason::NoPeers)
            );
        }
    }

    #[test]
    fn test_empty_snapshot_answers_locally() {
        let policy = RoutingPolicy::new(0.0, 16, ScriptedRandom::new(&[], &[]));

        assert_eq!(
            policy.decide(&Snapshot::default(), "a", 0),
            Decision::Local(TerminationReason::NoPeers)
        );
    }

    #[test]
    fn test_single_foreign_entry_answers_locally() {
        let policy = RoutingPolicy::new(0.0, 16, ScriptedRandom::new(&[], &[]));
        let snap = snapshot(&[("b", "h2")]);

        assert_eq!(
            policy.decide(&snap, "a", 0),
            Decision::Local(TerminationReason::SoleMember)
        );
    }

    #[test]
    fn test_draw_below_probability_terminates() {
        let policy = RoutingPolicy::new(0.1, 16, ScriptedRandom::new(&[0.05, 0.5], &[1]));
        let snap = snapshot(&[("a", "h1"), ("b", "h2"), ("c", "h3")]);

        assert_eq!(
            policy.decide(&snap, "a", 0),
            Decision::Local(TerminationReason::Drawn)
        );
        assert_eq!(
            policy.decide(&snap, "a", 0),
            Decision::Forward {
                name: "c".to_string(),
                addr: "h3".to_string()
            }
        );
    }

    #[test]
    fn test_probability_one_never_forwards() {
        let policy = RoutingPolicy::new(1.0, 16, Arc::new(SeededRandom::new(3)));
        let snap = snapshot(&[("a", "h1"), ("b", "h2")]);

        for _ in 0..1000 {
            assert_eq!(
                policy.decide(&snap, "a", 0),
                Decision::Local(TerminationReason::Drawn)
            );
        }
    }

    #[test]
    fn test_forward_never_targets_self() {
        let policy = RoutingPolicy::new(0.0, 16, Arc::new(SeededRandom::new(5)));
        let snap = snapshot(&[("a", "h1"), ("b", "h2"), ("c", "h3"), ("d", "h4")]);

        for _ in 0..1000 {
            match policy.decide(&snap, "b", 0) {
                Decision::Forward { name, .. } => assert_ne!(name, "b"),
                other => panic!("Expected a forward, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_peer_choice_is_uniform() {
        let policy = RoutingPolicy::new(0.0, 16, Arc::new(SeededRandom::new(11)));
        let snap = snapshot(&[("a", "h1"), ("b", "h2"), ("c", "h3"), ("d", "h4")]);
        let trials = 30_000;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            if let Decision::Forward { name, .. } = policy.decide(&snap, "a", 0) {
                *counts.entry(name).or_insert(0) += 1;
            }
        }

        assert_eq!(counts.len(), 3);
        for (name, count) in counts {
            let share = count as f64 / trials as f64;
            assert!(
                (share - 1.0 / 3.0).abs() < 0.02,
                "Peer {} got share {}",
                name,
                share
            );
        }
    }

    #[test]
    fn test_hop_limit_forces_termination() {
        let policy = RoutingPolicy::new(0.0, 3, ScriptedRandom::new(&[], &[]));
        let snap = snapshot(&[("a", "h1"), ("b", "h2")]);

        assert!(matches!(policy.decide(&snap, "a", 2), Decision::Forward { .. }));
        assert_eq!(
            policy.decide(&snap, "a", 3),
            Decision::Local(TerminationReason::HopLimit)
        );
    }

    #[test]
    fn test_zero_probability_chain_ends_at_hop_limit() {
        let policy = RoutingPolicy::new(0.0, 5, Arc::new(SeededRandom::new(9)));
        let snap = snapshot(&[("a", "h1"), ("b", "h2"), ("c", "h3")]);

        let mut current = "a".to_string();
        let mut hops = 0;
        while let Decision::Forward { name, .. } = policy.decide(&snap, &current, hops) {
            current = name;
            hops += 1;
        }

        assert_eq!(hops, 5);
    }

    #[test]
    fn test_mean_chain_length_is_inverse_probability() {
        let p = 0.25;
        let policy = RoutingPolicy::new(p, 10_000, Arc::new(SeededRandom::new(2024)));
        let snap = snapshot(&[("a", "h1"), ("b", "h2"), ("c", "h3"), ("d", "h4")]);
        let trials = 20_000;

        let mut total_length = 0u64;
        for _ in 0..trials {
            let mut current = "a".to_string();
            let mut hops = 0u32;
            while let Decision::Forward { name, .. } = policy.decide(&snap, &current, hops) {
                current = name;
                hops += 1;
            }
            // Length counts the node that answered.
            total_length += u64::from(hops) + 1;
        }

        let mean = total_length as f64 / trials as f64;
        assert!(
            (mean - 1.0 / p).abs() < 0.15,
            "Mean chain length {} should be close to {}",
            mean,
            1.0 / p
        );
    }

    #[test]
    fn test_probability_is_clamped() {
        let policy = RoutingPolicy::new(7.0, 1, ScriptedRandom::new(&[], &[]));
        assert_eq!(policy.termination_probability(), 1.0);
        assert_eq!(policy.max_hops(), 1);
    }

    #[test]
    fn test_random_port_range() {
        let random = SeededRandom::new(77);
        for _ in 0..1000 {
            let port = random.port(RANDOM_PORT_MIN, RANDOM_PORT_MAX);
            assert!((RANDOM_PORT_MIN..RANDOM_PORT_MAX).contains(&port));
        }
    }

    // ============================================================
    // SNAPSHOT CACHE TESTS
    // ============================================================

    #[test]
    fn test_cache_replaces_wholesale() {
        let cache = SnapshotCache::new();

        cache.apply(versioned("e", 1, &[("a", "h1"), ("b", "h2")]));
        cache.apply(versioned("e", 2, &[("c", "h3")]));

        let current = cache.current();
        assert_eq!(current.len(), 1, "No merge with the previous snapshot");
        assert_eq!(current.addr_of("c"), Some("h3"));
    }

    #[test]
    fn test_cache_rejects_out_of_order_push() {
        let cache = SnapshotCache::new();

        assert_eq!(cache.apply(versioned("e", 3, &[("a", "h1")])), ApplyOutcome::Applied);
        assert_eq!(
            cache.apply(versioned("e", 2, &[("a", "h1"), ("b", "h2")])),
            ApplyOutcome::Stale
        );

        assert_eq!(cache.current().version, 3);
        assert_eq!(cache.current().len(), 1);
    }

    #[test]
    fn test_cache_accepts_new_epoch() {
        let cache = SnapshotCache::new();
        cache.apply(versioned("old", 40, &[("a", "h1")]));

        let outcome = cache.apply(versioned("new", 1, &[("b", "h2")]));

        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(cache.current().epoch, "new");
    }

    #[test]
    fn test_reader_keeps_its_snapshot_across_replacement() {
        let cache = SnapshotCache::new();
        cache.apply(versioned("e", 1, &[("a", "h1")]));

        let held = cache.current();
        cache.apply(versioned("e", 2, &[("b", "h2")]));

        assert_eq!(held.addr_of("a"), Some("h1"));
        assert_eq!(cache.current().addr_of("b"), Some("h2"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_pushes_never_tear() {
        let cache = Arc::new(SnapshotCache::new());

        let mut handles = Vec::new();
        for version in 1..=50u64 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let name = format!("n{}", version);
                cache.apply(versioned("e", version, &[(name.as_str(), "h"), ("v", "h")]));
                let seen = cache.current();
                assert_eq!(seen.len(), 2, "Readers only see whole snapshots");
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.current().version, 50);
        assert_eq!(cache.current().addr_of("n50"), Some("h"));
    }

    // ============================================================
    // LIFECYCLE TESTS
    // ============================================================

    #[test]
    fn test_lifecycle_happy_path() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Unregistered);

        lifecycle.transition(LifecycleState::Registering).unwrap();
        lifecycle.transition(LifecycleState::Registered).unwrap();
        lifecycle.transition(LifecycleState::Unregistering).unwrap();
        lifecycle.transition(LifecycleState::Departed).unwrap();

        assert_eq!(lifecycle.state(), LifecycleState::Departed);
    }

    #[test]
    fn test_lifecycle_rejects_invalid_transitions() {
        let lifecycle = Lifecycle::new();

        assert!(matches!(
            lifecycle.transition(LifecycleState::Registered),
            Err(MeshError::Lifecycle(_))
        ));
        assert!(lifecycle.transition(LifecycleState::Unregistering).is_err());
        assert_eq!(lifecycle.state(), LifecycleState::Unregistered);

        lifecycle.transition(LifecycleState::Registering).unwrap();
        lifecycle.transition(LifecycleState::Registered).unwrap();
        lifecycle.transition(LifecycleState::Unregistering).unwrap();
        lifecycle.transition(LifecycleState::Departed).unwrap();

        assert!(
            lifecycle.transition(LifecycleState::Registering).is_err(),
            "Departed is terminal"
        );
    }

    #[tokio::test]
    async fn test_registration_failure_is_reported() {
        let dead = dead_addr().await;
        let mut config = node_config("a", 0.1, 16);
        config.discovery_url = format!("http://{}", dead);
        let node = ServiceNode::new(
            NodeIdentity {
                name: "a".to_string(),
                addr: "127.0.0.1:1".to_string(),
            },
            &config,
            Arc::new(SeededRandom::new(1)),
        );

        let result = node.register().await;

        assert!(matches!(result, Err(MeshError::RegistrationFailure(_))));
        assert_eq!(node.state(), LifecycleState::Unregistered);
    }

    #[tokio::test]
    async fn test_node_server_exits_when_registration_fails() {
        let dead = dead_addr().await;
        let mut config = node_config("a", 0.1, 16);
        config.discovery_url = format!("http://{}", dead);
        config.port = Some(0);
        config.shutdown_grace = Duration::from_millis(200);

        let server = NodeServer::bind(config).await.unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            server.run(std::future::pending()),
        )
        .await
        .expect("run should return instead of waiting for shutdown");

        assert!(matches!(result, Err(MeshError::RegistrationFailure(_))));
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_stalled_registration() {
        let stalled = stalled_addr().await;
        let mut config = node_config("a", 0.1, 16);
        config.discovery_url = format!("http://{}", stalled);
        config.port = Some(0);
        config.register_timeout = Duration::from_secs(5);
        config.register_attempts = 3;
        config.shutdown_grace = Duration::from_millis(300);

        let server = NodeServer::bind(config).await.unwrap();
        let node = server.node();
        let started = std::time::Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(3),
            server.run(tokio::time::sleep(Duration::from_millis(200))),
        )
        .await
        .expect("shutdown should not wait for registration retries");

        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(node.state(), LifecycleState::Unregistered);
    }

    #[tokio::test]
    async fn test_bind_listener_uses_bound_port_in_identity() {
        let random = SeededRandom::new(3);
        let (listener, identity) = bind_listener("a", "127.0.0.1", "127.0.0.1", Some(0), &random)
            .await
            .unwrap();

        let port = listener.local_addr().unwrap().port();
        assert_eq!(identity.addr, format!("127.0.0.1:{}", port));
        assert_eq!(identity.name, "a");
    }

    #[tokio::test]
    async fn test_wildcard_bind_advertises_configured_host() {
        let random = SeededRandom::new(3);
        let (listener, identity) = bind_listener("a", "0.0.0.0", "10.1.2.3", Some(0), &random)
            .await
            .unwrap();

        let port = listener.local_addr().unwrap().port();
        assert!(listener.local_addr().unwrap().ip().is_unspecified());
        assert_eq!(identity.addr, format!("10.1.2.3:{}", port));
    }

    #[tokio::test]
    async fn test_node_server_rejects_wildcard_advertisement() {
        let mut config = node_config("a", 0.1, 16);
        config.host = "0.0.0.0".to_string();
        config.port = Some(0);

        let result = NodeServer::bind(config).await;

        assert!(matches!(result, Err(MeshError::Config(_))));
    }

    // ============================================================
    // PROTOCOL TESTS
    // ============================================================

    #[test]
    fn test_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(CorrelationToken::from_headers(&headers), None);
        assert_eq!(hops_from_headers(&headers), 0);

        headers.insert(HEADER_CORRELATION_ID, HeaderValue::from_static("trace-1"));
        headers.insert(HEADER_HOPS, HeaderValue::from_static("4"));

        assert_eq!(
            CorrelationToken::from_headers(&headers),
            Some(CorrelationToken::from_static("trace-1"))
        );
        assert_eq!(hops_from_headers(&headers), 4);

        headers.insert(HEADER_HOPS, HeaderValue::from_static("many"));
        assert_eq!(hops_from_headers(&headers), 0);
    }

    #[test]
    fn test_non_utf8_token_is_kept_verbatim() {
        let raw: &[u8] = b"chain-\xe9t\xe9";
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_CORRELATION_ID, HeaderValue::from_bytes(raw).unwrap());

        let token = CorrelationToken::from_headers(&headers).expect("token should be accepted");

        assert_eq!(token.as_bytes(), raw);
        assert_eq!(token.header_value().as_bytes(), raw);
    }

    #[test]
    fn test_blank_token_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_CORRELATION_ID, HeaderValue::from_static(" \t "));

        assert_eq!(CorrelationToken::from_headers(&headers), None);
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        assert_ne!(CorrelationToken::generate(), CorrelationToken::generate());
    }

    // ============================================================
    // REQUEST HANDLING TESTS
    // ============================================================

    #[tokio::test]
    async fn test_lone_node_answers_locally_and_echoes_token() {
        let node = service_node("a", "127.0.0.1:1", 0.0, 16);
        node.apply_snapshot(versioned("e", 1, &[("a", "127.0.0.1:1")]));

        let reply = node
            .handle_hello(Some(CorrelationToken::from_static("chain-7")), 0)
            .await
            .unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(&reply.body[..], HELLO_BODY.as_bytes());
        assert_eq!(reply.served_by.as_deref(), Some("a"));
        assert_eq!(reply.correlation.as_bytes(), b"chain-7");
    }

    #[tokio::test]
    async fn test_missing_token_is_generated() {
        let node = service_node("a", "127.0.0.1:1", 0.0, 16);

        let reply = node.handle_hello(None, 0).await.unwrap();

        assert!(!reply.correlation.as_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_peer_surfaces_routing_failure() {
        let dead = dead_addr().await;
        let node = service_node("a", "127.0.0.1:1", 0.0, 16);
        node.apply_snapshot(versioned("e", 1, &[("a", "127.0.0.1:1"), ("b", dead.to_string().as_str())]));

        let result = node.handle_hello(None, 0).await;

        match result {
            Err(MeshError::RoutingFailure { peer, .. }) => assert_eq!(peer, "b"),
            other => panic!("Expected routing failure, got {:?}", other.map(|r| r.status)),
        }
    }

    #[tokio::test]
    async fn test_forward_relays_peer_answer_over_http() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let b_addr = listener.local_addr().unwrap().to_string();
        let b = service_node("b", &b_addr, 0.0, 1);
        spawn_server(listener, router(b.clone()), std::future::pending());

        let a = service_node("a", "127.0.0.1:1", 0.0, 1);
        let members = versioned("e", 1, &[("a", "127.0.0.1:1"), ("b", b_addr.as_str())]);
        a.apply_snapshot(members.clone());
        b.apply_snapshot(members);

        let reply = a
            .handle_hello(Some(CorrelationToken::from_static("chain-9")), 0)
            .await
            .unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(&reply.body[..], HELLO_BODY.as_bytes());
        assert_eq!(reply.served_by.as_deref(), Some("b"));
        assert_eq!(reply.correlation.as_bytes(), b"chain-9");
    }

    #[tokio::test]
    async fn test_forward_times_out_on_silent_peer() {
        let stalled = stalled_addr().await;
        let mut config = node_config("a", 0.0, 16);
        config.forward_timeout = Duration::from_millis(300);
        let node = service_node_with("127.0.0.1:1", &config);
        node.apply_snapshot(versioned(
            "e",
            1,
            &[("a", "127.0.0.1:1"), ("b", stalled.to_string().as_str())],
        ));

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(Duration::from_secs(3), node.handle_hello(None, 0))
            .await
            .expect("forward should give up after its own timeout");

        match result {
            Err(MeshError::RoutingFailure { peer, .. }) => assert_eq!(peer, "b"),
            other => panic!("Expected routing failure, got {:?}", other.map(|r| r.status)),
        }
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_peer_error_status_is_relayed_unchanged() {
        let peer = serve(Router::new().route(
            "/hello",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "draining\n") }),
        ))
        .await;
        let node = service_node("a", "127.0.0.1:1", 0.0, 16);
        node.apply_snapshot(versioned(
            "e",
            1,
            &[("a", "127.0.0.1:1"), ("b", peer.to_string().as_str())],
        ));

        let reply = node.handle_hello(None, 0).await.unwrap();

        assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(&reply.body[..], b"draining\n");
        assert_eq!(reply.served_by, None);
    }

    #[tokio::test]
    async fn test_non_utf8_token_is_forwarded_and_echoed_byte_for_byte() {
        let raw: &[u8] = b"chain-\xe9t\xe9";
        let seen: Arc<Mutex<Option<Vec<u8>>>> = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let peer = serve(Router::new().route(
            "/hello",
            get(move |headers: HeaderMap| {
                let sink = sink.clone();
                async move {
                    *sink.lock() = headers
                        .get(HEADER_CORRELATION_ID)
                        .map(|value| value.as_bytes().to_vec());
                    HELLO_BODY
                }
            }),
        ))
        .await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let a_addr = listener.local_addr().unwrap().to_string();
        let a = service_node("a", &a_addr, 0.0, 16);
        a.apply_snapshot(versioned(
            "e",
            1,
            &[("a", a_addr.as_str()), ("b", peer.to_string().as_str())],
        ));
        spawn_server(listener, router(a), std::future::pending());

        let response = reqwest::Client::new()
            .get(format!("http://{}/hello", a_addr))
            .header(HEADER_CORRELATION_ID, HeaderValue::from_bytes(raw).unwrap())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.headers()[HEADER_CORRELATION_ID].as_bytes(), raw);
        assert_eq!(seen.lock().as_deref(), Some(raw));
    }

    #[tokio::test]
    async fn test_push_endpoint_over_http() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let node = service_node("a", &addr.to_string(), 0.1, 16);
        spawn_server(listener, router(node.clone()), std::future::pending());
        let client = reqwest::Client::new();

        let pushed = versioned("e", 2, &[("a", "h1"), ("b", "h2")]);
        let response = client
            .post(format!("http://{}/registry", addr))
            .json(&pushed)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 204);

        let cached: Snapshot = client
            .get(format!("http://{}/registry", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(cached, pushed);

        let malformed = client
            .post(format!("http://{}/registry", addr))
            .body("[1, 2")
            .send()
            .await
            .unwrap();
        assert_eq!(malformed.status().as_u16(), 400);
        assert_eq!(node.snapshot().version, 2);
    }

    #[tokio::test]
    async fn test_hello_endpoint_sets_headers() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let node = service_node("solo", &addr.to_string(), 0.1, 16);
        spawn_server(listener, router(node), std::future::pending());

        let response = reqwest::Client::new()
            .get(format!("http://{}/hello", addr))
            .header(HEADER_CORRELATION_ID, "abc")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.headers()[HEADER_CORRELATION_ID], "abc");
        assert_eq!(response.headers()[HEADER_SERVED_BY], "solo");
        assert_eq!(response.text().await.unwrap(), HELLO_BODY);
    }
}
