use eyre::Result;
use healthchain_client::{
    chain::TransportError,
    permissions::{PermissionGate, PermissionQueryError},
};
use healthchain_data_model::prelude::*;
use parity_scale_codec::Encode;

use super::support::*;

#[tokio::test]
async fn self_access_skips_the_query() {
    let chain = FakeChain::new().into_arc();
    let gate = PermissionGate::new(chain.clone());
    let patient = account(&alice());

    assert!(gate.check_access(&patient, &patient).await);
    assert_eq!(chain.queries(), 0);
}

#[tokio::test]
async fn granted_permission_is_read_from_storage() -> Result<()> {
    let (patient, doctor) = (account(&alice()), account(&bob()));
    let chain = FakeChain::new()
        .with_storage(StorageQuery::permissions(&patient, &doctor), true.encode())
        .into_arc();
    let gate = PermissionGate::new(chain.clone());

    assert!(gate.try_check_access(&patient, &doctor).await?);
    assert!(!gate.try_check_access(&doctor, &patient).await?);
    assert_eq!(chain.queries(), 2);
    Ok(())
}

#[tokio::test]
async fn revoked_permission_reads_false() -> Result<()> {
    let (patient, doctor) = (account(&alice()), account(&bob()));
    let chain = FakeChain::new()
        .with_storage(StorageQuery::permissions(&patient, &doctor), false.encode())
        .into_arc();
    let gate = PermissionGate::new(chain);

    assert!(!gate.try_check_access(&patient, &doctor).await?);
    Ok(())
}

#[tokio::test]
async fn query_failure_fails_closed() {
    let (patient, doctor) = (account(&alice()), account(&bob()));
    let chain = FakeChain::new()
        .failing_queries(TransportError::Connection("socket closed".to_owned()))
        .into_arc();
    let gate = PermissionGate::new(chain.clone());

    assert!(!gate.check_access(&patient, &doctor).await);
    assert_eq!(
        gate.try_check_access(&patient, &doctor).await,
        Err(PermissionQueryError::Query(TransportError::Connection(
            "socket closed".to_owned()
        )))
    );
    assert_eq!(chain.queries(), 2);
}

#[tokio::test]
async fn malformed_value_fails_closed() {
    let (patient, doctor) = (account(&alice()), account(&bob()));
    let chain = FakeChain::new()
        .with_storage(StorageQuery::permissions(&patient, &doctor), vec![1, 0])
        .into_arc();
    let gate = PermissionGate::new(chain);

    assert!(!gate.check_access(&patient, &doctor).await);
    assert!(matches!(
        gate.try_check_access(&patient, &doctor).await,
        Err(PermissionQueryError::Decode(_))
    ));
}
