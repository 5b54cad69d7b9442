use std::sync::Arc;

use crate::dht::Chord;
use crate::dht::PeerRing;
use crate::dht::SuccessorReader;
use crate::error::Result;
use crate::tests::default::assert_partition;
use crate::tests::default::build_ring;
use crate::tests::default::fix_all_fingers;
use crate::tests::default::sorted_peers;
use crate::tests::default::stabilize_rounds;
use crate::tests::MemoryTransport;

fn node_of(nodes: &[Arc<PeerRing>], did: crate::dht::Did) -> Arc<PeerRing> {
    nodes
        .iter()
        .find(|n| n.did == did)
        .cloned()
        .expect("member of the ring")
}

#[tokio::test]
async fn test_successor_list_fallback() -> Result<()> {
    let transport = MemoryTransport::new();
    // 9, 10, 12, 17, 19, 39, 40 with m = 6
    let ports = [9000, 9001, 9002, 9004, 9006, 9007, 9012];
    let nodes = build_ring(&transport, &ports, 6).await?;
    let peers = sorted_peers(&nodes);

    let node = node_of(&nodes, peers[0].did);
    let successor = node.lock_finger()?.successor().expect("joined");
    assert_eq!(successor, peers[1]);
    assert_eq!(node.successors().get(1)?, Some(peers[2].clone()));

    transport.kill(&successor.address);

    // The next live entry takes over and finger[0] is repaired in place.
    assert_eq!(node.get_successor().await?, peers[2]);
    assert_eq!(node.lock_finger()?.successor(), Some(peers[2].clone()));

    let alive: Vec<Arc<PeerRing>> = nodes
        .iter()
        .filter(|n| n.did != successor.did)
        .cloned()
        .collect();
    stabilize_rounds(&alive, 2 * alive.len()).await?;
    fix_all_fingers(&alive).await?;

    for n in &alive {
        assert!(!n.successors().list()?.contains(&successor));
    }
    assert_partition(&alive).await
}

#[tokio::test]
async fn test_two_failures_in_a_row() -> Result<()> {
    let transport = MemoryTransport::new();
    let ports = [9000, 9001, 9002, 9004, 9006, 9007, 9012];
    let nodes = build_ring(&transport, &ports, 6).await?;
    let peers = sorted_peers(&nodes);

    transport.kill(&peers[3].address);
    transport.kill(&peers[4].address);

    let node = node_of(&nodes, peers[2].did);
    assert_eq!(node.get_successor().await?, peers[5]);

    let alive: Vec<Arc<PeerRing>> = nodes
        .iter()
        .filter(|n| n.did != peers[3].did && n.did != peers[4].did)
        .cloned()
        .collect();
    stabilize_rounds(&alive, 2 * alive.len()).await?;
    fix_all_fingers(&alive).await?;
    assert_partition(&alive).await
}

#[tokio::test]
async fn test_ring_shrinks_to_one() -> Result<()> {
    let transport = MemoryTransport::new();
    let nodes = build_ring(&transport, &[9003, 9014], 3).await?;
    transport.kill(&nodes[1].address);

    let survivor = nodes[0].clone();
    assert_eq!(survivor.get_successor().await?, survivor.local_peer());
    stabilize_rounds(&[survivor.clone()], 2).await?;
    assert!(survivor.successors().is_empty()?);
    assert_partition(&[survivor]).await
}
