use std::{collections::HashSet, time::Duration};

use disperser_client::{
    codec,
    credential::challenge_digest,
    mock::{AuthStep, MockDisperser},
    proto::{authenticated_request::Payload, BlobStatus},
    Credential, DispersalSettings, Error, RequestId, RetrieveHandle, StatusSnapshot,
};
use tests::{client, recover_signer, scripted_disperser, sent_signatures, ADDRESS, PRIVATE_KEY};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn disperse_until_confirmed() {
    let mock = scripted_disperser(
        &[7, 0xFFFF_FFFF],
        &[0xDE, 0xAD, 0xBE, 0xEF],
        3,
        MockDisperser::confirmed_reply(BlobStatus::Confirmed, vec![0x11; 32], 42),
    );
    let settings = DispersalSettings {
        custom_quorum_numbers: vec![0, 1],
        ..Default::default()
    };
    let start = Instant::now();

    let handle = client(&mock, settings)
        .disperse(b"some blob", PRIVATE_KEY, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(handle, RetrieveHandle::new(vec![0x11; 32], 42));
    // one query per interval, the first one after a full interval
    assert_eq!(start.elapsed(), Duration::from_secs(40));
    assert_eq!(mock.status_queries().len(), 4);
    assert!(mock
        .status_queries()
        .iter()
        .all(|query| query.request_id == [0xDE, 0xAD, 0xBE, 0xEF]));

    let requests = mock.sent_requests();
    assert_eq!(requests.len(), 3);
    let Some(Payload::DisperseRequest(request)) = &requests[0].payload else {
        panic!("the blob must be sent first");
    };
    assert_eq!(request.data, codec::pad_payload(b"some blob"));
    assert_eq!(request.custom_quorum_numbers, vec![0, 1]);

    let account = Credential::from_hex(PRIVATE_KEY).unwrap().account();
    assert_eq!(account.address, ADDRESS);
    assert_eq!(request.account_id, account.public_key);

    let signatures = sent_signatures(&requests);
    assert_eq!(signatures.len(), 2);
    for (challenge, signature) in [7, 0xFFFF_FFFF].into_iter().zip(&signatures) {
        assert_eq!(
            recover_signer(&challenge_digest(challenge), signature),
            account.public_key
        );
    }
    assert_eq!(mock.open_streams(), 0);
}

#[tokio::test(start_paused = true)]
async fn insufficient_signatures_keeps_polling() {
    let mock = scripted_disperser(
        &[1],
        b"req",
        0,
        MockDisperser::status_reply(BlobStatus::InsufficientSignatures),
    );
    mock.push_status([MockDisperser::confirmed_reply(
        BlobStatus::Finalized,
        vec![0x22; 32],
        3,
    )]);

    let handle = client(&mock, DispersalSettings::default())
        .disperse(b"blob", PRIVATE_KEY, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(handle, RetrieveHandle::new(vec![0x22; 32], 3));
    assert_eq!(mock.status_queries().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_dispersal_reports_request_id() {
    let mock = scripted_disperser(
        &[1],
        b"req",
        1,
        MockDisperser::status_reply(BlobStatus::Failed),
    );

    let result = client(&mock, DispersalSettings::default())
        .disperse(b"blob", PRIVATE_KEY, &CancellationToken::new())
        .await;

    match result {
        Err(Error::DispersalFailed { request_id }) => assert_eq!(request_id.as_bytes(), b"req"),
        other => panic!("expected a failed dispersal, got {other:?}"),
    }
    assert_eq!(mock.status_queries().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unexpected_reply_aborts_without_polling() {
    let mock = MockDisperser::default();
    mock.push_auth([AuthStep::Challenge(9), AuthStep::Empty]);

    let result = client(&mock, DispersalSettings::default())
        .disperse(b"blob", PRIVATE_KEY, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(Error::ProtocolViolation(_))));
    assert!(mock.status_queries().is_empty());
    assert_eq!(mock.open_streams(), 0);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_surfaces_as_transport_error() {
    let mock = MockDisperser::default();
    mock.fail_open();

    let result = client(&mock, DispersalSettings::default())
        .disperse(b"blob", PRIVATE_KEY, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(Error::Transport(_))));
    assert!(mock.sent_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn caller_cancellation_stops_polling() {
    let mock = scripted_disperser(
        &[1],
        b"req",
        100,
        MockDisperser::status_reply(BlobStatus::Processing),
    );
    let client = client(&mock, DispersalSettings::default());
    let cancel = CancellationToken::new();
    let start = Instant::now();

    let canceller = {
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            cancel.cancel();
        }
    };
    let (result, ()) = tokio::join!(client.disperse(b"blob", PRIVATE_KEY, &cancel), canceller);

    match result {
        Err(Error::DispersalTimeout {
            request_id: Some(request_id),
        }) => assert_eq!(request_id.as_bytes(), b"req"),
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert_eq!(start.elapsed(), Duration::from_secs(25));
    assert_eq!(mock.status_queries().len(), 2);

    // nothing is queried once the dispersal gave up
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(mock.status_queries().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn resume_after_deadline() {
    let mock = scripted_disperser(
        &[1],
        b"req",
        1,
        MockDisperser::status_reply(BlobStatus::Dispersing),
    );
    let settings = DispersalSettings {
        timeout: Some(Duration::from_secs(25)),
        ..Default::default()
    };
    let client = client(&mock, settings);

    let request_id = match client
        .disperse(b"blob", PRIVATE_KEY, &CancellationToken::new())
        .await
    {
        Err(Error::DispersalTimeout {
            request_id: Some(request_id),
        }) => request_id,
        other => panic!("expected a timeout, got {other:?}"),
    };
    assert_eq!(request_id, RequestId::from(b"req".to_vec()));

    mock.push_status([
        MockDisperser::status_reply(BlobStatus::Processing),
        MockDisperser::confirmed_reply(BlobStatus::Confirmed, vec![0x33; 32], 0),
    ]);
    assert_eq!(
        client.blob_status(&request_id).await.unwrap(),
        StatusSnapshot::Pending(BlobStatus::Processing)
    );
    let handle = client
        .wait_for_confirmation(&request_id, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(handle, RetrieveHandle::new(vec![0x33; 32], 0));
}

#[tokio::test(start_paused = true)]
async fn concurrent_dispersals_share_a_client() {
    let mock = MockDisperser::default();
    mock.push_auth([
        AuthStep::Reply(MockDisperser::disperse_reply(b"first")),
        AuthStep::Reply(MockDisperser::disperse_reply(b"second")),
    ]);
    mock.push_status([
        MockDisperser::confirmed_reply(BlobStatus::Confirmed, vec![0x44; 32], 1),
        MockDisperser::confirmed_reply(BlobStatus::Confirmed, vec![0x44; 32], 1),
    ]);
    let client = client(&mock, DispersalSettings::default());
    let cancel = CancellationToken::new();

    let (first, second) = tokio::join!(
        client.disperse(b"one", PRIVATE_KEY, &cancel),
        client.disperse(b"two", PRIVATE_KEY, &cancel),
    );

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(mock.streams_opened(), 2);
    let queried: HashSet<_> = mock
        .status_queries()
        .into_iter()
        .map(|query| query.request_id)
        .collect();
    assert_eq!(
        queried,
        HashSet::from([b"first".to_vec(), b"second".to_vec()])
    );
}

#[tokio::test]
async fn invalid_key_is_rejected_up_front() {
    let mock = MockDisperser::default();

    for key in ["", "0x", "xyz", &PRIVATE_KEY[..62]] {
        let result = client(&mock, DispersalSettings::default())
            .disperse(b"blob", key, &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(Error::InvalidCredential(_))), "{key}");
    }
    assert_eq!(mock.streams_opened(), 0);
}

#[test]
fn settings_from_yaml() {
    let settings: DispersalSettings = serde_yaml::from_str(
        "status_poll_interval: 2s\ntimeout: 5m\ncustom_quorum_numbers: [0, 1]\n",
    )
    .unwrap();
    assert_eq!(settings.status_poll_interval, Duration::from_secs(2));
    assert_eq!(settings.timeout, Some(Duration::from_secs(300)));
    assert_eq!(settings.custom_quorum_numbers, vec![0, 1]);
}
