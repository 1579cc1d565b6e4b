//! Ledgers and parties over the durable backends.

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use proptest::prelude::*;
use tempfile::TempDir;
use tessera::core::{canonical_content, decode_line};
use tessera::crypto::Ed25519Crypto;
use tessera::store::{FsStore, MemoryStore, SqliteStore, StorageProvider};
use tessera::{
    offer_trust, Address, Error, Frame, FrameBody, FrameKind, LedgerConfig, Party, Serializable,
    Timestamp, DEFAULT_LEDGER,
};
use tessera_testkit::generators::{frame, link_all};
use tessera_testkit::{
    init_tracing, read_only_ledger, read_write_ledger, verify_all_vectors, TestNetwork,
};

fn private_party(dir: &TempDir) -> Party {
    Party::builder("https://alice.example")
        .private(
            Arc::new(FsStore::open(dir.path())),
            Arc::new(Ed25519Crypto::on_disk(dir.path())),
        )
        .build()
}

#[tokio::test]
async fn test_fs_party_survives_reopen() -> Result<()> {
    init_tracing();
    let dir = TempDir::new()?;

    let (frames, public_key) = {
        let party = private_party(&dir);
        let ledger = party.ledger()?;
        for text in ["first", "second"] {
            let nonce = ledger.nonce().await?;
            let frame = ledger
                .seal(
                    FrameBody::Payload {
                        payload: Bytes::from_static(text.as_bytes()),
                    },
                    Some(nonce),
                    Some(1736870400000),
                )
                .await?;
            ledger.append(frame).await?;
        }
        (ledger.frames().await?, ledger.public_key().await?)
    };

    let reopened = private_party(&dir);
    let ledger = reopened.ledger()?;
    assert_eq!(ledger.frames().await?, frames);
    assert_eq!(ledger.public_key().await?, public_key);
    assert!(FsStore::open(dir.path())
        .ledger_path(&Address::new(DEFAULT_LEDGER))
        .is_file());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_ledger_line_is_invalid_representation() -> Result<()> {
    init_tracing();
    let bad_lines = [
        r#"{"type":"unknown-kind","hash":"AA==","index":0,"previousHash":""}"#,
        r#"{"type":"payload","payload":"AA==","index":0,"previousHash":""}"#,
        "not json",
    ];

    for line in bad_lines {
        let dir = TempDir::new()?;
        let store = FsStore::open(dir.path());
        let path = store.ledger_path(&Address::new(tessera_testkit::fixtures::TEST_LEDGER));
        std::fs::create_dir_all(path.parent().expect("chain dir"))?;
        std::fs::write(&path, format!("{line}\n"))?;

        let ledger = read_only_ledger(Arc::new(store));
        let err = ledger.frames().await.unwrap_err();
        assert!(err.is_invalid_representation(), "{line}: {err}");

        let decoded: tessera::Result<_> = decode_line(line).map_err(Error::from);
        assert!(decoded.unwrap_err().is_invalid_representation());
    }
    Ok(())
}

#[tokio::test]
async fn test_sqlite_party_handshake() -> Result<()> {
    init_tracing();
    let dir = TempDir::new()?;
    let db = dir.path().join("ledger.db");

    let network = TestNetwork::new();
    let alice = network
        .add_party_with(
            "https://alice.example",
            Arc::new(SqliteStore::open(&db)?),
            Arc::new(Ed25519Crypto::in_memory()),
        )
        .await;
    let bob = network.add_party("https://bob.example").await;

    let handshake = offer_trust(&alice, bob.address()).await?;

    let observer = Party::builder("https://alice.example")
        .public(Arc::new(SqliteStore::open(&db)?))
        .build();
    let head = observer.ledger()?.head().await?.expect("head");
    assert_eq!(head, handshake.offer);
    assert_eq!(head.kind(), FrameKind::TrustExchange);
    Ok(())
}

#[tokio::test]
async fn test_backends_store_identical_chains() -> Result<()> {
    let dir = TempDir::new()?;
    let memory = MemoryStore::new();
    let fs = FsStore::open(dir.path().join("fs"));
    let sqlite = SqliteStore::open_memory()?;
    let crypto = Arc::new(Ed25519Crypto::in_memory());

    let ledgers = [
        read_write_ledger(Arc::new(memory), crypto.clone(), LedgerConfig::default()),
        read_write_ledger(Arc::new(fs), crypto.clone(), LedgerConfig::default()),
        read_write_ledger(Arc::new(sqlite), crypto, LedgerConfig::default()),
    ];

    let frame = ledgers[0]
        .seal(
            FrameBody::TrustExchange {
                target_identifier: Address::new("https://bob.example"),
            },
            None,
            Some(7),
        )
        .await?;
    let mut chains = Vec::new();
    for ledger in &ledgers {
        ledger.append(frame.clone()).await?;
        ledger.append(frame.clone()).await?;
        chains.push(ledger.frames().await?);
    }

    assert_eq!(chains[0].len(), 2);
    assert_eq!(chains[0], chains[1]);
    assert_eq!(chains[1], chains[2]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_ledgers_sharing_a_root_extend_one_chain() -> Result<()> {
    init_tracing();
    let dir = TempDir::new()?;
    let crypto = Arc::new(Ed25519Crypto::in_memory());

    let writers: Vec<_> = (0..6)
        .map(|_| {
            let ledger = read_write_ledger(
                Arc::new(FsStore::open(dir.path())),
                crypto.clone(),
                LedgerConfig::default(),
            );
            tokio::spawn(async move {
                for _ in 0..8 {
                    let nonce = ledger.nonce().await?;
                    let frame = ledger.seal(FrameBody::Hash, Some(nonce), None).await?;
                    ledger.append(frame).await?;
                }
                Ok::<_, Error>(())
            })
        })
        .collect();
    for writer in writers {
        writer.await??;
    }

    let frames = read_only_ledger(Arc::new(FsStore::open(dir.path())))
        .frames()
        .await?;
    assert_eq!(frames.len(), 48);
    assert!(frames[0].is_genesis());
    for pair in frames.windows(2) {
        assert!(pair[1].follows(&pair[0]));
    }
    Ok(())
}

#[tokio::test]
async fn test_fractional_timestamps_persist() -> Result<()> {
    init_tracing();
    let dir = TempDir::new()?;
    let stores: [Arc<dyn StorageProvider>; 2] = [
        Arc::new(FsStore::open(dir.path())),
        Arc::new(SqliteStore::open_memory()?),
    ];

    for store in stores {
        let ledger = read_write_ledger(
            store.clone(),
            Arc::new(Ed25519Crypto::in_memory()),
            LedgerConfig {
                verify_hash_on_append: true,
            },
        );
        for timestamp in [
            Timestamp::from_f64(1736870400000.5),
            Timestamp::from_f64(1e19),
            Some(Timestamp::from(u64::MAX)),
        ] {
            let mut frame = Frame::new(Bytes::new(), FrameBody::Hash);
            frame.timestamp = timestamp;
            frame.hash = ledger
                .hash(&[Serializable::from(canonical_content(&frame))])
                .await?;
            ledger.append(frame).await?;
        }

        let stored: Vec<_> = read_only_ledger(store)
            .frames()
            .await?
            .into_iter()
            .map(|f| f.frame.timestamp)
            .collect();
        assert_eq!(
            stored,
            [
                Timestamp::from_f64(1736870400000.5),
                Timestamp::from_f64(1e19),
                Some(Timestamp::from(u64::MAX)),
            ]
        );
    }
    Ok(())
}

#[test]
fn test_golden_vectors() {
    if let Err(failures) = verify_all_vectors() {
        panic!("golden vectors failed:\n{}", failures.join("\n"));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_fs_store_preserves_appended_frames(frames in prop::collection::vec(frame(), 1..6)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let dir = TempDir::new().unwrap();

        let stored = runtime.block_on(async {
            let ledger = read_write_ledger(
                Arc::new(FsStore::open(dir.path())),
                Arc::new(Ed25519Crypto::in_memory()),
                LedgerConfig::default(),
            );
            for frame in &frames {
                ledger.append(frame.clone()).await.unwrap();
            }
            ledger.frames().await.unwrap()
        });

        prop_assert_eq!(stored, link_all(frames));
    }
}
