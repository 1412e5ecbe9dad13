use eyre::Result;
use healthchain_client::{
    actions::{AccessRequest, Actions, OwnRecordRequest, RecordRequest},
    samples::get_client_config,
    submit::WaitFor,
};
use healthchain_data_model::{call::index, prelude::*};
use parity_scale_codec::Encode;

use super::support::*;

fn succeed_with(event: &MedicalEvent) -> Script {
    Script::new([in_block(
        "b1",
        [Event::from(event), Event::extrinsic_success()],
    )])
}

#[tokio::test]
async fn grant_access_is_signed_by_patient() -> Result<()> {
    let (patient, doctor) = (account(&alice()), account(&bob()));
    let granted = MedicalEvent::AccessGranted { patient, doctor };
    let chain = FakeChain::new()
        .with_script(succeed_with(&granted))
        .with_block("b1", 3)
        .into_arc();
    let actions = Actions::new(chain.clone(), keyring(), config(WaitFor::InBlock));

    let receipt = actions
        .grant_access(&AccessRequest { patient, doctor })
        .await?;

    assert_eq!(receipt.medical_events(), vec![granted]);
    let (call, signer) = chain.submissions.lock()[0].clone();
    assert_eq!(signer, patient);
    assert_eq!(call.pallet().index, index::MEDICAL_PERMISSIONS);
    assert_eq!(call.method().index, index::GRANT_ACCESS);
    assert_eq!(call.args(), doctor.encode());
    Ok(())
}

#[tokio::test]
async fn revoke_access_is_signed_by_patient() -> Result<()> {
    let (patient, doctor) = (account(&alice()), account(&bob()));
    let chain = FakeChain::new()
        .with_script(succeed_with(&MedicalEvent::AccessRevoked { patient, doctor }))
        .with_block("b1", 3)
        .into_arc();
    let actions = Actions::new(chain.clone(), keyring(), config(WaitFor::InBlock));

    actions
        .revoke_access(&AccessRequest { patient, doctor })
        .await?;

    let (call, signer) = chain.submissions.lock()[0].clone();
    assert_eq!(signer, patient);
    assert_eq!(call, Call::revoke_access(&doctor));
    Ok(())
}

#[tokio::test]
async fn record_actions_are_signed_by_doctor() -> Result<()> {
    let (patient, doctor) = (account(&alice()), account(&bob()));
    let file_hash = FileHash::from_cid("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG")?;
    let request = RecordRequest {
        patient,
        doctor,
        file_hash: file_hash.clone(),
    };
    let chain = FakeChain::new()
        .with_script(Script::new([in_block("b1", [Event::extrinsic_success()])]))
        .with_block("b1", 5)
        .into_arc();
    let actions = Actions::new(chain.clone(), keyring(), config(WaitFor::InBlock));

    actions.create_record(&request).await?;
    actions.read_patient_data(&request).await?;

    let submissions = chain.submissions.lock().clone();
    assert_eq!(
        submissions,
        vec![
            (Call::create_record(&patient, &file_hash), doctor),
            (Call::read_patient_data(&patient, &file_hash), doctor),
        ]
    );
    assert_eq!(chain.releases(), 2);
    Ok(())
}

#[tokio::test]
async fn read_own_data_is_signed_by_patient() -> Result<()> {
    let patient = account(&alice());
    let file_hash = FileHash::from_cid("QmRecord")?;
    let accessed = MedicalEvent::OwnDataAccessed {
        patient,
        file_hash: file_hash.clone(),
    };
    let chain = FakeChain::new()
        .with_script(succeed_with(&accessed))
        .with_block("b1", 8)
        .into_arc();
    let actions = Actions::new(chain.clone(), keyring(), config(WaitFor::InBlock));

    let receipt = actions
        .read_own_data(&OwnRecordRequest { patient, file_hash })
        .await?;

    assert_eq!(receipt.block_number, 8);
    assert_eq!(receipt.medical_events(), vec![accessed]);
    assert_eq!(chain.submissions.lock()[0].1, patient);
    Ok(())
}

#[tokio::test]
async fn unknown_signer_never_reaches_the_chain() {
    let (patient, doctor) = (account(&charlie()), account(&bob()));
    let chain = FakeChain::new().into_arc();
    let actions = Actions::new(chain.clone(), keyring(), config(WaitFor::InBlock));

    let result = actions.grant_access(&AccessRequest { patient, doctor }).await;

    assert_eq!(result, Err(ActionError::UnknownSigner(patient)));
    assert_eq!(chain.submitted(), 0);
    assert_eq!(chain.releases(), 0);
}

#[tokio::test]
async fn check_access_forwards_to_gate() {
    let (patient, doctor) = (account(&alice()), account(&bob()));
    let chain = FakeChain::new()
        .with_storage(StorageQuery::permissions(&patient, &doctor), true.encode())
        .into_arc();
    let actions = Actions::new(chain.clone(), keyring(), get_client_config().transaction);

    assert!(actions.check_access(&AccessRequest { patient, doctor }).await);
    assert!(
        actions
            .check_access(&AccessRequest {
                patient,
                doctor: patient
            })
            .await
    );
    assert_eq!(chain.queries(), 1);
    assert_eq!(chain.submitted(), 0);
}

#[test]
fn addresses_render_with_configured_prefix() -> Result<()> {
    let mut config = get_client_config();
    config.ss58_prefix = 2;
    let actions = Actions::from_config(FakeChain::new().into_arc(), keyring(), &config)?;
    let patient = account(&alice());

    let address = actions.address(&patient);

    assert_eq!(address, patient.to_ss58(Ss58Prefix::new(2)?));
    assert_ne!(address, patient.to_string());
    assert_eq!(AccountId::from_ss58(&address)?, (patient, Ss58Prefix::new(2)?));
    Ok(())
}

#[test]
fn out_of_range_prefix_is_refused() {
    let mut config = get_client_config();
    config.ss58_prefix = 20_000;

    let result = Actions::from_config(FakeChain::new().into_arc(), keyring(), &config);

    assert!(matches!(result, Err(ParseError::Ss58Prefix(20_000))));
}
