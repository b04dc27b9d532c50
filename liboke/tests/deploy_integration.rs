//! Deployment procedure against a recording chain

use std::path::Path;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolValue;
use liboke::deploy::mock::{ChainCall, RecordingChain};
use liboke::deploy::{run_deployment, ArtifactStore, DeployPlan, MINTER, OKE_NFT, OKE_SBT};
use liboke::error::DeployError;
use tempfile::TempDir;

const CREATION_CODE: &str = "0x6080604052";

fn write_artifacts(root: &Path, names: &[&str]) {
    let store = ArtifactStore::new(root);
    for name in names {
        let path = store.path_for(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let artifact = serde_json::json!({
            "_format": "hh-sol-artifact-1",
            "contractName": name,
            "sourceName": format!("contracts/{}.sol", name),
            "abi": [],
            "bytecode": CREATION_CODE,
            "deployedBytecode": "0x",
            "linkReferences": {},
            "deployedLinkReferences": {}
        });
        std::fs::write(&path, serde_json::to_string_pretty(&artifact).unwrap()).unwrap();
    }
}

fn setup() -> (TempDir, ArtifactStore) {
    let temp_dir = TempDir::new().unwrap();
    write_artifacts(temp_dir.path(), &[OKE_NFT, OKE_SBT, MINTER]);
    let store = ArtifactStore::new(temp_dir.path());
    (temp_dir, store)
}

fn deploys(chain: &RecordingChain) -> Vec<(String, Vec<u8>)> {
    chain
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            ChainCall::Deploy { contract, init_code } => Some((contract, init_code.to_vec())),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_full_deployment_order_and_wiring() {
    let (_temp_dir, artifacts) = setup();
    let deployer = Address::with_last_byte(0xde);
    let chain = RecordingChain::new(deployer);

    let report = run_deployment(&chain, &artifacts, &DeployPlan::default())
        .await
        .unwrap();

    let deployed = deploys(&chain);
    let names: Vec<_> = deployed.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec![OKE_NFT, OKE_SBT, MINTER]);

    // Both token contracts grant their minter role to the Minter
    let grants: Vec<_> = chain
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            ChainCall::GrantRole {
                contract,
                role,
                account,
                ..
            } => Some((contract, role, account)),
            _ => None,
        })
        .collect();
    assert_eq!(
        grants,
        vec![
            (report.oke_nft.address, RecordingChain::minter_role_id(), report.minter.address),
            (report.oke_sbt.address, RecordingChain::minter_role_id(), report.minter.address),
        ]
    );
    assert_eq!(report.deployer, deployer);
}

#[tokio::test]
async fn test_constructor_arguments() {
    let (_temp_dir, artifacts) = setup();
    let deployer = Address::with_last_byte(0xde);
    let chain = RecordingChain::new(deployer);
    let plan = DeployPlan::default();

    let report = run_deployment(&chain, &artifacts, &plan).await.unwrap();
    let deployed = deploys(&chain);
    let code = alloy::primitives::hex::decode(CREATION_CODE).unwrap();

    let nft_args = (
        "Oke NFT".to_string(),
        "OKE".to_string(),
        deployer,
        plan.erc6551_registry,
        plan.erc6551_implementation,
    )
        .abi_encode_params();
    assert_eq!(deployed[0].1, [code.clone(), nft_args].concat());

    assert_eq!(deployed[1].1, [code.clone(), (deployer,).abi_encode_params()].concat());

    let minter_args = (
        report.oke_nft.address,
        report.oke_sbt.address,
        deployer,
        deployer,
        U256::from(10_000_000_000_000_000u128),
    )
        .abi_encode_params();
    assert_eq!(deployed[2].1, [code, minter_args].concat());
}

#[tokio::test]
async fn test_custom_admin_and_fee_recipient() {
    let (_temp_dir, artifacts) = setup();
    let chain = RecordingChain::new(Address::with_last_byte(0xde));
    let plan = DeployPlan {
        admin: Some(Address::with_last_byte(0xa0)),
        fee_recipient: Some(Address::with_last_byte(0xfe)),
        ..DeployPlan::default()
    };

    run_deployment(&chain, &artifacts, &plan).await.unwrap();

    let sbt_code = &deploys(&chain)[1].1;
    assert!(sbt_code.ends_with(&(Address::with_last_byte(0xa0),).abi_encode_params()));
}

#[tokio::test]
async fn test_reverted_grant_aborts_run() {
    let (_temp_dir, artifacts) = setup();
    let chain = RecordingChain::new(Address::with_last_byte(1)).reverting_at("grant OkeNFT MINTER_ROLE");

    let err = run_deployment(&chain, &artifacts, &DeployPlan::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::Reverted { ref step, .. } if step == "grant OkeNFT MINTER_ROLE"));

    // Nothing runs after the failure
    let sbt_role_reads = chain
        .calls()
        .into_iter()
        .filter(|call| matches!(call, ChainCall::MinterRole { label, .. } if label == OKE_SBT))
        .count();
    assert_eq!(sbt_role_reads, 0);
}

#[tokio::test]
async fn test_missing_artifact_fails_before_any_transaction() {
    let temp_dir = TempDir::new().unwrap();
    write_artifacts(temp_dir.path(), &[OKE_NFT, OKE_SBT]);
    let chain = RecordingChain::new(Address::with_last_byte(1));

    let err = run_deployment(&chain, &ArtifactStore::new(temp_dir.path()), &DeployPlan::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Artifact { ref contract, .. } if contract == MINTER));
    assert!(deploys(&chain).is_empty());
}

#[tokio::test]
async fn test_wrong_chain_fails_before_any_transaction() {
    let (_temp_dir, artifacts) = setup();
    let chain = RecordingChain::new(Address::with_last_byte(1)).with_chain_id(1);
    let plan = DeployPlan {
        expected_chain_id: Some(11_155_111),
        ..DeployPlan::default()
    };

    let err = run_deployment(&chain, &artifacts, &plan).await.unwrap_err();

    assert!(matches!(
        err,
        DeployError::ChainMismatch {
            expected: 11_155_111,
            found: 1
        }
    ));
    assert_eq!(chain.calls(), vec![ChainCall::ChainId]);
}

#[tokio::test]
async fn test_matching_chain_is_reported() {
    let (_temp_dir, artifacts) = setup();
    let chain = RecordingChain::new(Address::with_last_byte(1)).with_chain_id(11_155_111);
    let plan = DeployPlan {
        expected_chain_id: Some(11_155_111),
        ..DeployPlan::default()
    };

    let report = run_deployment(&chain, &artifacts, &plan).await.unwrap();

    assert_eq!(report.chain_id, 11_155_111);
    assert_eq!(chain.calls()[0], ChainCall::ChainId);
    assert_eq!(deploys(&chain).len(), 3);
}
