use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::client::Client;
use crate::client::HttpTransport;
use crate::client::CHORD_PATH;
use crate::endpoint::bind;
use crate::endpoint::run_http_api;
use crate::prelude::chord_core::config::ChordConfig;
use crate::prelude::chord_core::dht::NodeState;
use crate::prelude::chord_core::dht::Peer;
use crate::prelude::chord_core::transport::RetryPolicy;
use crate::prelude::reqwest;
use crate::prelude::Address;
use crate::prelude::Chord;
use crate::prelude::Did;
use crate::prelude::PeerRing;
use crate::prelude::Stabilizer;

const LOG_SIZE: u8 = 24;

fn test_config() -> ChordConfig {
    ChordConfig {
        log_size: LOG_SIZE,
        successors: 3,
        stabilize_interval: Duration::from_millis(50),
        fix_fingers_interval: Duration::from_millis(20),
        update_successors_interval: Duration::from_millis(50),
        retry: RetryPolicy::new(2, Duration::from_millis(10)),
    }
}

/// A node on an ephemeral loopback port with its http server running, not joined yet.
fn serve_node(bootstrap: Option<Address>) -> Arc<PeerRing> {
    let listener = bind(&Address::new("127.0.0.1", 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    let transport = Arc::new(HttpTransport::new(Duration::from_secs(1)).unwrap());
    let dht = Arc::new(
        PeerRing::new(
            Address::new("127.0.0.1", port),
            bootstrap,
            test_config(),
            transport,
        )
        .unwrap(),
    );
    tokio::spawn(run_http_api(listener, dht.clone()));
    dht
}

/// Joined node with its repair loops running.
async fn spawn_node(bootstrap: Option<Address>) -> Arc<PeerRing> {
    let dht = serve_node(bootstrap);
    dht.join().await.unwrap();
    Stabilizer::new(dht.clone()).spawn();
    dht
}

fn responsible(sorted: &[Peer], did: Did) -> Peer {
    sorted
        .iter()
        .find(|p| p.did >= did)
        .unwrap_or(&sorted[0])
        .clone()
}

async fn ring_is_consistent(nodes: &[Arc<PeerRing>]) -> bool {
    let mut sorted: Vec<Peer> = nodes.iter().map(|n| n.local_peer()).collect();
    sorted.sort();
    for (i, peer) in sorted.iter().enumerate() {
        let node = nodes.iter().find(|n| n.did == peer.did).unwrap();
        let expected = &sorted[(i + 1) % sorted.len()];
        if node.lock_finger().unwrap().successor().as_ref() != Some(expected) {
            return false;
        }
        let predecessor = node.lock_predecessor().unwrap().clone();
        if predecessor.as_ref() != Some(&sorted[(i + sorted.len() - 1) % sorted.len()]) {
            return false;
        }
    }
    true
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_http_ring_partition() {
    let first = spawn_node(None).await;
    let bootstrap = Some(first.address.clone());
    let mut nodes = vec![first];
    for _ in 0..4 {
        nodes.push(spawn_node(bootstrap.clone()).await);
    }

    let mut consistent = false;
    for _ in 0..200 {
        if ring_is_consistent(&nodes).await {
            consistent = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(consistent, "ring did not converge");

    let mut sorted: Vec<Peer> = nodes.iter().map(|n| n.local_peer()).collect();
    sorted.sort();
    let space = nodes[0].space;
    let targets: Vec<Did> = sorted
        .iter()
        .flat_map(|p| [p.did, space.offset(p.did, 1), space.offset(p.did, space.size() - 1)])
        .collect();

    for node in &nodes {
        let answers = join_all(targets.iter().map(|did| node.find_successor(*did))).await;
        for (did, answer) in targets.iter().zip(answers) {
            assert_eq!(
                answer.unwrap(),
                responsible(&sorted, *did),
                "lookup of {} from {}",
                did,
                node.did
            );
        }
    }

    let client = Client::new(nodes[1].address.clone(), Duration::from_secs(1)).unwrap();
    let target = sorted[2].did;
    assert_eq!(client.lookup(target).await.unwrap().result, sorted[2].address);
    let status = client.status().await.unwrap().result;
    assert_eq!(status.did, nodes[1].did);
    assert_eq!(status.state, NodeState::Active);
    assert!(status.successor.is_some());
}

#[tokio::test]
async fn test_endpoint_rejects_bad_body() {
    let node = serve_node(None);
    let url = format!("http://{}{}", node.address, CHORD_PATH);
    let client = reqwest::Client::new();

    let resp = client.post(&url).body("not a command").send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let resp = client
        .post(&url)
        .body(r#"{"cmd": "PUT", "data": 1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    assert!(resp.headers().contains_key("X-NODE-VERSION"));
}

#[tokio::test]
async fn test_endpoint_before_and_after_join() {
    let node = serve_node(None);
    let url = format!("http://{}{}", node.address, CHORD_PATH);
    let client = reqwest::Client::new();

    // Only PING is served before join.
    let resp = client
        .post(&url)
        .body(r#"{"cmd": "PING"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.json::<serde_json::Value>().await.unwrap(),
        serde_json::json!({"data": true})
    );

    let resp = client
        .post(&url)
        .body(r#"{"cmd": "GET_SUCCESSOR"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 500);

    node.join().await.unwrap();
    let resp = client
        .post(&url)
        .body(r#"{"cmd": "GET_SUCCESSOR"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.json::<serde_json::Value>().await.unwrap(),
        serde_json::json!({"data": {"ip": "127.0.0.1", "port": node.address.port}})
    );

    let resp = client
        .post(&url)
        .body(r#"{"cmd": "GET_PREDECESSOR"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.json::<serde_json::Value>().await.unwrap(),
        serde_json::json!({"data": null})
    );
}

#[tokio::test]
async fn test_join_through_dead_bootstrap_fails() {
    let listener = bind(&Address::new("127.0.0.1", 0)).unwrap();
    let dead = Address::new("127.0.0.1", listener.local_addr().unwrap().port());
    drop(listener);

    let node = serve_node(Some(dead));
    let err = node.join().await.unwrap_err();
    assert!(err.is_fatal());
}
