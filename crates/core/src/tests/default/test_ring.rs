use crate::dht::Chord;
use crate::dht::Did;
use crate::dht::SuccessorReader;
use crate::error::Error;
use crate::error::Result;
use crate::message::Command;
use crate::message::IdentifierPayload;
use crate::message::Payload;
use crate::message::Response;
use crate::tests::default::assert_converged;
use crate::tests::default::assert_partition;
use crate::tests::default::build_ring;
use crate::tests::MemoryTransport;

#[tokio::test]
async fn test_ring_of_2_5_7() -> Result<()> {
    let transport = MemoryTransport::new();
    // 127.0.0.1:9003 -> 2, 127.0.0.1:9014 -> 5, 127.0.0.1:9001 -> 7 with m = 3
    let nodes = build_ring(&transport, &[9003, 9014, 9001], 3).await?;
    let dids: Vec<Did> = nodes.iter().map(|n| n.did).collect();
    assert_eq!(dids, vec![Did::from(2), Did::from(5), Did::from(7)]);
    assert_converged(&nodes).await?;

    for node in &nodes {
        assert_eq!(node.find_successor(Did::from(3)).await?.did, Did::from(5));
        assert_eq!(node.find_successor(Did::from(7)).await?.did, Did::from(7));
        assert_eq!(node.find_successor(Did::from(0)).await?.did, Did::from(2));
    }
    assert_partition(&nodes).await
}

#[tokio::test]
async fn test_ring_partition_from_every_member() -> Result<()> {
    let transport = MemoryTransport::new();
    // Distinct identifiers 40, 39, 17, 9, 10, 19, 6, 12 with m = 6
    let ports = [9000, 9001, 9002, 9004, 9006, 9007, 9008, 9012];
    let nodes = build_ring(&transport, &ports, 6).await?;
    assert_converged(&nodes).await?;
    assert_partition(&nodes).await?;

    // Every finger points at the successor of its start.
    for node in &nodes {
        let finger = node.lock_finger()?.clone();
        for i in 0..6 {
            let start = node.space.finger_start(node.did, i);
            let expected = node.find_successor(start).await?;
            assert_eq!(finger[i].as_ref(), Some(&expected), "finger {} of {}", i, node.did);
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_single_node_ring() -> Result<()> {
    let transport = MemoryTransport::new();
    let nodes = build_ring(&transport, &[9008], 6).await?;
    let node = &nodes[0];
    for k in 0..64 {
        assert_eq!(node.find_successor(Did::from(k)).await?, node.local_peer());
    }
    assert!(node.successors().is_empty()?);
    assert_converged(&nodes).await
}

#[tokio::test]
async fn test_join_with_taken_identifier() -> Result<()> {
    let transport = MemoryTransport::new();
    // 127.0.0.1:9005 hashes to 2 as well.
    transport.spawn(9003, None, 3).await?;
    let err = transport.spawn(9005, Some(9003), 3).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, Error::IdentifierCollision { did, .. } if did == Did::from(2)));
    Ok(())
}

#[tokio::test]
async fn test_join_through_missing_bootstrap() -> Result<()> {
    let transport = MemoryTransport::new();
    let err = transport.spawn(9014, Some(9003), 3).await.unwrap_err();
    assert!(matches!(err, Error::JoinFailed { .. }));
    Ok(())
}

#[tokio::test]
async fn test_commands_over_transport() -> Result<()> {
    let transport = MemoryTransport::new();
    let nodes = build_ring(&transport, &[9003, 9014, 9001], 3).await?;
    let node = &nodes[0];

    let resp = node
        .handle_command(Command::FindSuccessor(IdentifierPayload {
            identifier: Did::from(4),
        }))
        .await?;
    assert_eq!(
        resp,
        Response::with(Payload::Address(nodes[1].address.clone()))
    );

    let resp = node.handle_command(Command::GetPredecessor).await?;
    assert_eq!(
        resp,
        Response::with(Payload::Address(nodes[2].address.clone()))
    );

    // Capped to r - 1 entries on the wire.
    match node.handle_command(Command::GetSuccessors).await?.data {
        Some(Payload::Addresses(list)) => assert!(list.len() <= 3),
        other => panic!("unexpected {:?}", other),
    }

    let remote = nodes[1].remote(node.address.clone());
    assert!(remote.ping().await);
    assert_eq!(remote.get_successor().await?, nodes[1].local_peer());
    Ok(())
}
