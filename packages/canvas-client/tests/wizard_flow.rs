//! Creation wizard: Create → Approve → List against scripted gateways.

mod common;

use canvas_client::{ClientConfig, Error, Wizard, WizardStep};
use canvas_types::U128;
use common::{failed_outcome, mint_event_log, success_outcome, MockGateway, MockPinning};
use std::sync::Arc;

fn make_wizard() -> (
    Wizard<MockGateway, MockPinning>,
    Arc<MockGateway>,
    Arc<MockGateway>,
    Arc<MockPinning>,
    ClientConfig,
) {
    let config = ClientConfig::default();
    let nft = Arc::new(MockGateway::new());
    let market = Arc::new(MockGateway::new());
    let pinning = Arc::new(MockPinning::new());
    let wizard = Wizard::new(
        Arc::clone(&nft),
        Arc::clone(&market),
        Arc::clone(&pinning),
        &config,
    );
    (wizard, nft, market, pinning, config)
}

fn fill_required(wizard: &mut Wizard<MockGateway, MockPinning>) {
    wizard.draft_mut().set_name("A");
    wizard.draft_mut().set_description("B");
    wizard.draft_mut().set_image("ipfs://X");
}

#[tokio::test]
async fn missing_fields_block_upload_and_mint() {
    let (mut wizard, nft, _market, pinning, _config) = make_wizard();
    wizard.draft_mut().set_name("A");

    let err = wizard.submit_create().await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(pinning.upload_count(), 0);
    assert_eq!(nft.total_writes(), 0);
    assert_eq!(wizard.step(), WizardStep::Create);
}

#[tokio::test]
async fn full_create_approve_list_flow() {
    let (mut wizard, nft, market, pinning, config) = make_wizard();
    fill_required(&mut wizard);

    pinning.queue_json_upload(Ok("Q1".to_string()));
    nft.queue_write(
        "mint",
        Ok(success_outcome("tx-mint", vec![mint_event_log(7)])),
    );

    let receipt = wizard.submit_create().await.unwrap();
    assert_eq!(receipt.token_id, 7);
    assert_eq!(receipt.metadata_cid, "Q1");
    assert_eq!(receipt.token_uri, "https://ipfs.io/ipfs/Q1");
    assert_eq!(wizard.step(), WizardStep::Approve);
    assert_eq!(wizard.draft().token_id(), Some(7));

    // The pinned metadata is the validated snapshot.
    let uploaded = pinning.upload_log.lock().unwrap()[0].clone();
    assert_eq!(uploaded.name, "A");
    assert_eq!(uploaded.description, "B");
    assert_eq!(uploaded.image, "ipfs://X");

    // The mint call carried the token URI and the configured deposit.
    let mint_writes = nft.writes_for("mint");
    assert_eq!(mint_writes.len(), 1);
    assert_eq!(
        mint_writes[0].0["token_uri"],
        serde_json::json!("https://ipfs.io/ipfs/Q1")
    );
    assert_eq!(mint_writes[0].1, config.mint_deposit.0);

    nft.queue_write("approve", Ok(success_outcome("tx-approve", vec![])));
    wizard.submit_approve().await.unwrap();
    assert_eq!(wizard.step(), WizardStep::List);

    let approve_writes = nft.writes_for("approve");
    assert_eq!(approve_writes[0].0["token_id"], serde_json::json!(7));
    assert_eq!(
        approve_writes[0].0["account_id"],
        serde_json::json!(config.marketplace_contract)
    );

    market.queue_write("list_for_sale", Ok(success_outcome("tx-list", vec![])));
    let listed = wizard
        .submit_list(U128(500_000_000_000_000_000_000_000))
        .await
        .unwrap();
    assert_eq!(listed.token_id, 7);
    assert!(wizard.is_complete());
    assert_eq!(wizard.step(), WizardStep::List);

    // List is terminal: another submit is refused.
    let err = wizard.submit_list(U128(1)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn mint_receipt_without_event_reports_distinct_error() {
    let (mut wizard, nft, _market, pinning, _config) = make_wizard();
    fill_required(&mut wizard);

    pinning.queue_json_upload(Ok("Q1".to_string()));
    nft.queue_write(
        "mint",
        Ok(success_outcome("tx-mint", vec!["plain log".to_string()])),
    );

    let err = wizard.submit_create().await.unwrap_err();
    assert!(matches!(err, Error::MintNotRecovered(_)));
    assert_eq!(wizard.step(), WizardStep::Create);
    assert_eq!(wizard.draft().token_id(), None);
}

#[tokio::test]
async fn failed_upload_leaves_create_step_without_mint_call() {
    let (mut wizard, nft, _market, pinning, _config) = make_wizard();
    fill_required(&mut wizard);

    pinning.queue_json_upload(Err(Error::Pinning("service unavailable".into())));

    let err = wizard.submit_create().await.unwrap_err();
    assert!(matches!(err, Error::Pinning(_)));
    assert_eq!(nft.write_count("mint"), 0);
    assert_eq!(wizard.step(), WizardStep::Create);

    // Same step is retryable once the service recovers.
    pinning.queue_json_upload(Ok("Q2".to_string()));
    nft.queue_write(
        "mint",
        Ok(success_outcome("tx-mint", vec![mint_event_log(9)])),
    );
    let receipt = wizard.submit_create().await.unwrap();
    assert_eq!(receipt.token_id, 9);
    assert_eq!(wizard.step(), WizardStep::Approve);
}

#[tokio::test]
async fn onchain_mint_failure_keeps_step_unchanged() {
    let (mut wizard, nft, _market, pinning, _config) = make_wizard();
    fill_required(&mut wizard);

    pinning.queue_json_upload(Ok("Q1".to_string()));
    nft.queue_write(
        "mint",
        Ok(failed_outcome("tx-mint", "Smart contract panicked")),
    );

    let err = wizard.submit_create().await.unwrap_err();
    assert!(matches!(err, Error::TxFailed(_)));
    assert_eq!(wizard.step(), WizardStep::Create);
    assert_eq!(wizard.draft().token_id(), None);
}

#[tokio::test]
async fn out_of_order_submits_are_rejected_locally() {
    let (mut wizard, nft, market, _pinning, _config) = make_wizard();

    let err = wizard.submit_approve().await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let err = wizard.submit_list(U128(1)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert_eq!(nft.total_writes(), 0);
    assert_eq!(market.total_writes(), 0);
}

#[tokio::test]
async fn image_upload_sets_both_gateway_uris() {
    let (mut wizard, _nft, _market, _pinning, _config) = make_wizard();
    let file = canvas_client::UploadedFile {
        cid: "QmImg".to_string(),
        upload_id: "file-1".to_string(),
    };
    wizard.set_image_from_upload(&file);

    let details = wizard.draft().full_details();
    assert_eq!(details.image, "https://ipfs.io/ipfs/QmImg");
    assert_eq!(
        details.fallback_image,
        "https://gateway.pinata.cloud/ipfs/QmImg"
    );
}
