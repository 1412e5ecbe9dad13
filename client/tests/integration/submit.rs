use std::time::Duration;

use eyre::Result;
use healthchain_client::{
    chain::TransportError,
    decode::StaticRegistry,
    submit::{Submitter, TransactionConfig, WaitFor},
};
use healthchain_data_model::prelude::*;

use super::support::*;

fn grant_to_bob() -> Call {
    Call::grant_access(&account(&bob()))
}

#[tokio::test]
async fn success_receipt_reports_fetched_height() -> Result<()> {
    let chain = FakeChain::new()
        .with_script(Script::new([
            Notification::new(LifecycleStage::Ready),
            Notification::new(LifecycleStage::Broadcast),
            in_block("b1", [Event::extrinsic_success()]),
        ]))
        .with_block("b1", 42)
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::InBlock));
    let call = grant_to_bob();

    let receipt = submitter.submit(&call, &alice()).await?;

    assert_eq!(receipt.block_number, 42);
    assert_eq!(receipt.block_hash, block("b1"));
    assert_eq!(receipt.transaction_hash, call.hash());
    assert_eq!(receipt.events, vec![Event::extrinsic_success()]);
    assert_eq!(chain.releases(), 1);
    Ok(())
}

#[tokio::test]
async fn duplicate_terminal_notifications_settle_once() -> Result<()> {
    let chain = FakeChain::new()
        .with_script(Script::new([
            in_block("b1", [Event::extrinsic_success()]),
            in_block("b1", [Event::extrinsic_success()]),
            Notification::new(LifecycleStage::Finalized(block("b1")))
                .with_events([Event::extrinsic_success()]),
        ]))
        .with_block("b1", 7)
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::InBlock));

    let receipt = submitter.submit(&grant_to_bob(), &alice()).await?;

    assert_eq!(receipt.block_number, 7);
    assert_eq!(chain.submitted(), 1);
    assert_eq!(chain.releases(), 1);
    Ok(())
}

#[tokio::test]
async fn failure_event_fails() {
    let chain = FakeChain::new()
        .with_script(Script::new([in_block("b1", [Event::extrinsic_failed()])]))
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::InBlock));

    let result = submitter.submit(&grant_to_bob(), &alice()).await;

    assert_eq!(result, Err(ActionError::FinalizedWithFailure));
    assert_eq!(chain.releases(), 1);
}

#[tokio::test]
async fn dispatch_error_is_decoded_with_registry() {
    let registry = StaticRegistry::new().with_pallet(
        3,
        "MedicalPermissions",
        &[
            ("SelfPermissionNotAllowed", &["Patient cannot grant themselves"]),
            ("NotAuthorized", &["Doctor not authorized"]),
        ],
    );
    let chain = FakeChain::new()
        .with_registry(registry)
        .with_script(Script::new([in_block("b1", [Event::extrinsic_failed()])
            .with_dispatch_error(ModuleError::new(3, 1))]))
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::InBlock));

    let error = submitter
        .submit(&grant_to_bob(), &alice())
        .await
        .expect_err("dispatch error must fail the call");

    let message = error.to_string();
    assert!(message.contains("MedicalPermissions.NotAuthorized"), "{message}");
    assert!(message.contains("Doctor not authorized"), "{message}");
    assert_eq!(chain.releases(), 1);
}

#[tokio::test]
async fn healthchain_dispatch_error_is_decoded() {
    let chain = FakeChain::new()
        .with_script(Script::new([in_block("b1", [])
            .with_dispatch_error(ModuleError::new(7, 3))]))
        .into_arc();
    let submitter = Submitter::new(chain, config(WaitFor::InBlock));
    let call = Call::create_record(&account(&alice()), &FileHash::from_cid("Qm").unwrap());

    let result = submitter.submit(&call, &bob()).await;

    assert_eq!(
        result,
        Err(ActionError::Dispatch(ErrorMetadata::new(
            "MedicalHistory",
            "NoPermission",
            &["Doctor does not have permission to write for this patient."],
        )))
    );
}

#[tokio::test]
async fn unknown_dispatch_error_degrades_to_raw_code() {
    let chain = FakeChain::new()
        .with_script(Script::new([in_block("b1", [Event::extrinsic_failed()])
            .with_dispatch_error(ModuleError::new(200, 9))]))
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::InBlock));

    let error = submitter
        .submit(&grant_to_bob(), &alice())
        .await
        .expect_err("dispatch error must fail the call");

    let ActionError::DispatchOther(message) = &error else {
        panic!("expected a raw dispatch error, got {error:?}");
    };
    assert!(message.contains("Module { index: 200, error: 9 }"), "{message}");
    assert_eq!(chain.releases(), 1);
}

#[tokio::test]
async fn other_dispatch_error_is_passed_through() {
    let chain = FakeChain::new()
        .with_script(Script::new([
            in_block("b1", []).with_dispatch_error(DispatchError::Other("BadOrigin".to_owned()))
        ]))
        .into_arc();
    let submitter = Submitter::new(chain, config(WaitFor::InBlock));

    let result = submitter.submit(&grant_to_bob(), &alice()).await;

    assert_eq!(
        result,
        Err(ActionError::DispatchOther("BadOrigin".to_owned()))
    );
}

#[tokio::test]
async fn pool_rejection_fails() {
    let chain = FakeChain::new()
        .with_script(Script::new([
            Notification::new(LifecycleStage::Ready),
            Notification::new(LifecycleStage::Invalid),
        ]))
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::InBlock));

    let result = submitter.submit(&grant_to_bob(), &alice()).await;

    assert_eq!(
        result,
        Err(ActionError::Rejected(LifecycleStage::Invalid))
    );
    assert_eq!(chain.releases(), 1);
}

#[tokio::test]
async fn missing_block_fails_with_block_query() {
    let chain = FakeChain::new()
        .with_script(Script::new([in_block("unknown", [Event::extrinsic_success()])]))
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::InBlock));

    let result = submitter.submit(&grant_to_bob(), &alice()).await;

    assert_eq!(
        result,
        Err(ActionError::BlockQuery {
            hash: block("unknown"),
            reason: TransportError::UnknownBlock(block("unknown")).to_string(),
        })
    );
    assert_eq!(chain.releases(), 1);
}

#[tokio::test]
async fn submission_failure_is_transport_error() {
    let chain = FakeChain::new()
        .failing_submission(TransportError::Connection("connection refused".to_owned()))
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::InBlock));

    let result = submitter.submit(&grant_to_bob(), &alice()).await;

    assert_eq!(
        result,
        Err(ActionError::Transport(
            "Connection error: connection refused".to_owned()
        ))
    );
    assert_eq!(chain.releases(), 0);
}

#[tokio::test]
async fn closed_stream_fails() {
    let chain = FakeChain::new()
        .with_script(Script::new([Notification::new(LifecycleStage::Ready)]).closing())
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::InBlock));

    let result = submitter.submit(&grant_to_bob(), &alice()).await;

    assert_eq!(result, Err(ActionError::SubscriptionClosed));
    assert_eq!(chain.releases(), 1);
}

#[tokio::test(start_paused = true)]
async fn silent_chain_times_out_and_releases() {
    let chain = FakeChain::new()
        .with_script(Script::new([Notification::new(LifecycleStage::Ready)]))
        .into_arc();
    let timeout = Duration::from_secs(30);
    let submitter = Submitter::new(
        chain.clone(),
        TransactionConfig {
            status_timeout: timeout,
            wait_for: WaitFor::InBlock,
        },
    );

    let result = submitter.submit(&grant_to_bob(), &alice()).await;

    assert_eq!(result, Err(ActionError::Timeout(timeout)));
    assert_eq!(chain.releases(), 1);
}

#[tokio::test]
async fn finalized_policy_waits_for_finality() -> Result<()> {
    let chain = FakeChain::new()
        .with_script(Script::new([
            in_block("b1", [Event::extrinsic_success()]),
            finalized("b1"),
        ]))
        .with_block("b1", 10)
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::Finalized));

    let receipt = submitter.submit(&grant_to_bob(), &alice()).await?;

    assert_eq!(receipt.block_number, 10);
    assert_eq!(receipt.events, vec![Event::extrinsic_success()]);
    assert_eq!(chain.releases(), 1);
    Ok(())
}

#[tokio::test]
async fn retraction_resets_remembered_success() -> Result<()> {
    let chain = FakeChain::new()
        .with_script(Script::new([
            in_block("b1", [Event::extrinsic_success()]),
            Notification::new(LifecycleStage::Retracted(block("b1"))),
            in_block("b2", [Event::extrinsic_success()]),
            finalized("b2"),
        ]))
        .with_block("b1", 10)
        .with_block("b2", 11)
        .into_arc();
    let submitter = Submitter::new(chain, config(WaitFor::Finalized));

    let receipt = submitter.submit(&grant_to_bob(), &alice()).await?;

    assert_eq!(receipt.block_hash, block("b2"));
    assert_eq!(receipt.block_number, 11);
    Ok(())
}

#[tokio::test]
async fn concurrent_submissions_settle_independently() -> Result<()> {
    let to_bob = grant_to_bob();
    let to_charlie = Call::grant_access(&account(&charlie()));
    let chain = FakeChain::new()
        .with_call_script(
            &to_bob,
            Script::new([in_block("b1", [Event::extrinsic_success()])]),
        )
        .with_call_script(
            &to_charlie,
            Script::new([in_block("b2", [Event::extrinsic_failed()])]),
        )
        .with_block("b1", 1)
        .with_block("b2", 2)
        .into_arc();
    let submitter = Submitter::new(chain.clone(), config(WaitFor::InBlock));
    let signer = alice();

    let (first, second) = tokio::join!(
        submitter.submit(&to_bob, &signer),
        submitter.submit(&to_charlie, &signer),
    );

    assert_eq!(first?.block_number, 1);
    assert_eq!(second, Err(ActionError::FinalizedWithFailure));
    assert_eq!(chain.submitted(), 2);
    assert_eq!(chain.releases(), 2);
    Ok(())
}
