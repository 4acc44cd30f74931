use std::sync::Arc;

use alloy_primitives::{address, Address, Bytes, U256};
use mockall::predicate::eq;
use nft_action_common::{
    errors::{IdentifierError, ResolutionError},
    models::{
        action::{ActionDescriptor, AttachedActionModule, ModuleKind, Publication, PublicationIdentifier},
        execution::{ExecutionOutcome, ExecutionParams, ExecutionRequest},
        listing::{ContentReference, ListingInfo, NftMetadata, Price, SaleKind},
        Marketplace,
    },
    traits::{MockBridgeProvider, MockMarketplaceProvider, MockPublicationProvider, Route},
};
use nft_action_core::{ActionKit, ModuleDeployment, ModuleRegistry};
use pretty_assertions::assert_eq;
use rstest::rstest;
use url::Url;

const USDC_BASE: Address = address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913");
const MODULE_BASE: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
const MODULE_POLYGON: Address = address!("abababababababababababababababababababab");
const BRIDGE_ENTRY: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
const NFT: Address = address!("9ee91f9f426fa633d227f7a9b000e28b9dfd8599");
const OPENSEA_URI: &str = "https://opensea.io/assets/base/0x9ee91f9f426fa633d227f7a9b000e28b9dfd8599/42";

fn registry() -> ModuleRegistry {
    ModuleRegistry::new(vec![
        ModuleDeployment {
            kind: ModuleKind::FixedPrice,
            chain_id: 8453,
            address: MODULE_BASE,
            marketplace: None,
        },
        ModuleDeployment {
            kind: ModuleKind::FixedPrice,
            chain_id: 137,
            address: MODULE_POLYGON,
            marketplace: None,
        },
    ])
}

fn base_listing() -> ListingInfo {
    ListingInfo {
        content: ContentReference::new(Marketplace::OPENSEA, NFT, U256::from(42u64), 8453),
        price: Some(Price::new(U256::from(5_000_000u64), USDC_BASE)),
        seller: Some(Address::repeat_byte(0x55)),
        sale_kind: SaleKind::FixedPrice,
        metadata: NftMetadata::default(),
    }
}

fn params(quantity: i64, src_chain_id: u64, payment_token: Address) -> ExecutionParams {
    ExecutionParams {
        quantity,
        actor_profile_id: "10859".to_string(),
        executing_client_profile_id: "10".to_string(),
        sender_address: Address::repeat_byte(0x35),
        profile_owner_address: Address::repeat_byte(0x36),
        src_chain_id,
        payment_token,
        source_url: None,
    }
}

/// A marketplace provider claiming every URI served from `host` as a reference to `listing`.
fn marketplace(
    marketplace: Marketplace,
    host: &'static str,
    listing: ListingInfo,
    times: usize,
) -> Arc<MockMarketplaceProvider> {
    let mut mock = MockMarketplaceProvider::new();
    mock.expect_marketplace()
        .return_const(marketplace);
    mock.expect_platform_name()
        .return_const(host.to_string());
    let content = listing.content.clone();
    mock.expect_parse_content_uri()
        .returning(move |uri: &Url| (uri.host_str() == Some(host)).then(|| content.clone()));
    mock.expect_fetch_listing()
        .times(times)
        .returning(move |_| Ok(Some(listing.clone())));
    Arc::new(mock)
}

fn bridge(route: Route) -> Arc<MockBridgeProvider> {
    let mut bridge = MockBridgeProvider::new();
    bridge
        .expect_name()
        .return_const("decent".to_string());
    bridge
        .expect_find_route()
        .times(1)
        .returning(move |_| Ok(Some(route.clone())));
    Arc::new(bridge)
}

/// A publication provider that must never be reached.
fn unused_publications() -> Arc<MockPublicationProvider> {
    let mut publications = MockPublicationProvider::new();
    publications
        .expect_fetch_publication()
        .never();
    Arc::new(publications)
}

/// Serves a publication carrying `modules` under `composite_id`.
fn publications(composite_id: &'static str, modules: Vec<AttachedActionModule>) -> Arc<MockPublicationProvider> {
    let mut publications = MockPublicationProvider::new();
    publications
        .expect_fetch_publication()
        .with(eq(composite_id))
        .times(1)
        .returning(move |id| {
            Ok(Some(Publication {
                id: id.to_string(),
                author_profile_id: "0x2a6b".to_string(),
                action_modules: modules.clone(),
            }))
        });
    Arc::new(publications)
}

/// Publishes an action for the Base listing the way a client would, through `detect_action`.
async fn published_module() -> AttachedActionModule {
    let kit = ActionKit::builder(registry())
        .marketplace(marketplace(Marketplace::OPENSEA, "opensea.io", base_listing(), 1))
        .build();

    let action = kit
        .detect_action(OPENSEA_URI, "10")
        .await
        .unwrap();

    AttachedActionModule {
        contract_address: action.action_module_address,
        chain_id: action.chain_id,
        initialize_calldata: action.initialize_calldata,
    }
}

#[test_log::test(tokio::test)]
async fn test_post_on_same_chain_is_called_directly() {
    let module = published_module().await;
    let kit = ActionKit::builder(registry())
        .publications(publications("0x2a6b-0x01d8", vec![module]))
        .build();

    let outcome = kit
        .action_from_post("https://hey.xyz/posts/0x2a6b-0x01d8", params(2, 8453, USDC_BASE))
        .await
        .unwrap();

    let ExecutionOutcome::Ready(result) = outcome else { panic!("expected calldata") };
    assert_eq!(result.to, MODULE_BASE);
    assert_eq!(result.chain_id, 8453);
    assert_eq!(result.value, U256::ZERO);
    assert!(!result.is_bridged());
}

#[test_log::test(tokio::test)]
async fn test_post_on_other_chain_is_bridged() {
    let module = published_module().await;

    // Calldata the module would receive if called directly on Base.
    let direct = ActionKit::builder(registry())
        .publications(publications("0x2a6b-0x01d8", vec![module.clone()]))
        .build()
        .action_from_post("0x2a6b-0x01d8", params(2, 8453, USDC_BASE))
        .await
        .unwrap();
    let ExecutionOutcome::Ready(direct) = direct else { panic!("expected calldata") };

    let mut bridge = MockBridgeProvider::new();
    bridge
        .expect_name()
        .return_const("decent".to_string());
    bridge
        .expect_find_route()
        .times(1)
        .returning(|request| {
            assert_eq!(request.src_chain_id, 137);
            assert_eq!(request.amount, U256::from(10_000_000u64));
            Ok(Some(Route { to: BRIDGE_ENTRY, data: Bytes::from(vec![0xde, 0xc0]), value: U256::from(3u64) }))
        });
    let kit = ActionKit::builder(registry())
        .publications(publications("0x2a6b-0x01d8", vec![module]))
        .bridge(Arc::new(bridge))
        .build();

    let outcome = kit
        .action_from_post("https://hey.xyz/posts/0x2a6b-0x01d8", params(2, 137, USDC_BASE))
        .await
        .unwrap();

    let ExecutionOutcome::Ready(result) = outcome else { panic!("expected calldata") };
    let routing = result.routing.clone().unwrap();
    assert_eq!(result.to, BRIDGE_ENTRY);
    assert_eq!(result.chain_id, 137);
    assert_eq!(result.value, U256::from(3u64));
    assert_eq!(routing.destination_chain_id, 8453);
    assert_eq!(routing.destination_call.to, MODULE_BASE);
    assert_eq!(routing.destination_call.data, direct.data);
}

#[test_log::test(tokio::test)]
async fn test_build_execution_calldata_is_deterministic() {
    let module = published_module().await;
    let kit = ActionKit::builder(registry())
        .publications(publications("0x01-0x02", vec![module.clone()]))
        .build();
    let other = ActionKit::builder(registry())
        .publications(publications("0x01-0x02", vec![module]))
        .build();

    let first = kit
        .action_from_post("0x01-0x02", params(1, 8453, USDC_BASE))
        .await
        .unwrap();
    let second = other
        .action_from_post("0x01-0x02", params(1, 8453, USDC_BASE))
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[test_log::test(tokio::test)]
async fn test_bridged_calldata_is_deterministic() {
    let module = published_module().await;
    let request = ExecutionRequest {
        action: ActionDescriptor::new(module.contract_address, module.initialize_calldata, module.chain_id),
        publication: PublicationIdentifier { profile_id: "10859".to_string(), post_id: "472".to_string() },
        params: params(3, 137, Address::ZERO),
    };
    let route = Route { to: BRIDGE_ENTRY, data: Bytes::from(vec![0xde, 0xc0]), value: U256::from(7u64) };
    let kit = ActionKit::builder(registry())
        .bridge(bridge(route.clone()))
        .build();
    let other = ActionKit::builder(registry())
        .bridge(bridge(route))
        .build();

    let first = kit
        .build_execution_calldata(&request)
        .await
        .unwrap();
    let second = other
        .build_execution_calldata(&request)
        .await
        .unwrap();

    let first_routing = first.routing.clone().unwrap();
    let second_routing = second.routing.clone().unwrap();
    assert_eq!(first.to, BRIDGE_ENTRY);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first_routing.destination_call.data.as_ref(), second_routing.destination_call.data.as_ref());
    assert_eq!(first_routing.destination_call, second_routing.destination_call);
}

#[test_log::test(tokio::test)]
async fn test_marketplace_unknown_to_core_is_configurable() {
    let foundation = Marketplace::new("foundation");
    let module = address!("f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0");
    let mut listing = base_listing();
    listing.content.marketplace = foundation.clone();
    let registry = ModuleRegistry::new(vec![ModuleDeployment {
        kind: ModuleKind::FixedPrice,
        chain_id: 8453,
        address: module,
        marketplace: Some(foundation.clone()),
    }]);
    let kit = ActionKit::builder(registry)
        .marketplace(marketplace(Marketplace::OPENSEA, "opensea.io", base_listing(), 0))
        .marketplace(marketplace(foundation.clone(), "foundation.app", listing, 2))
        .build();
    let uri = "https://foundation.app/mint/base/0x9ee91f9f426fa633d227f7a9b000e28b9dfd8599";

    let action = kit.detect_action(uri, "10").await.unwrap();
    let display = kit
        .generate_display_data(uri)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(action.action_module_address, module);
    assert_eq!(display.marketplace, foundation);
    assert_eq!(display.platform_name, "foundation.app");
}

#[test_log::test(tokio::test)]
async fn test_post_without_modules_is_no_action() {
    let kit = ActionKit::builder(registry())
        .publications(publications("0x01-0x02", vec![]))
        .build();

    let outcome = kit
        .action_from_post("https://hey.xyz/posts/0x01-0x02", params(1, 137, Address::ZERO))
        .await
        .unwrap();

    match outcome {
        ExecutionOutcome::NoAction { publication } => {
            assert_eq!(publication.profile_id, "1");
            assert_eq!(publication.post_id, "2");
        }
        other => panic!("expected no action, got {other:?}"),
    }
}

#[rstest]
#[case::zero(0)]
#[case::negative(-1)]
#[tokio::test]
async fn test_invalid_quantity_contacts_no_provider(#[case] quantity: i64) {
    let mut bridge = MockBridgeProvider::new();
    bridge.expect_find_route().never();
    bridge
        .expect_name()
        .return_const("decent".to_string());
    let kit = ActionKit::builder(registry())
        .publications(unused_publications())
        .bridge(Arc::new(bridge))
        .build();

    let err = kit
        .action_from_post("https://hey.xyz/posts/0x01-0x02", params(quantity, 137, Address::ZERO))
        .await
        .unwrap_err();

    assert!(matches!(err, ResolutionError::InvalidQuantity(q) if q == quantity));
}

#[rstest]
#[case::empty_segment("https://hey.xyz/posts/", true)]
#[case::no_marker("https://hey.xyz/u/stani", false)]
#[case::blank("", false)]
#[tokio::test]
async fn test_missing_post_id_is_never_fetched(#[case] link: &str, #[case] empty: bool) {
    let kit = ActionKit::builder(registry())
        .publications(unused_publications())
        .build();

    let err = kit
        .action_from_post(link, params(1, 137, Address::ZERO))
        .await
        .unwrap_err();

    match err {
        ResolutionError::InvalidIdentifier(IdentifierError::Empty { .. }) => assert!(empty),
        ResolutionError::InvalidIdentifier(IdentifierError::Absent { .. }) => assert!(!empty),
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
#[case::single_component("https://hey.xyz/posts/0x01")]
#[case::not_hex("https://hey.xyz/posts/0x01-0xzz")]
#[tokio::test]
async fn test_malformed_publication_id_is_never_fetched(#[case] link: &str) {
    let kit = ActionKit::builder(registry())
        .publications(unused_publications())
        .build();

    let err = kit
        .action_from_post(link, params(1, 137, Address::ZERO))
        .await
        .unwrap_err();

    assert!(matches!(err, ResolutionError::MalformedPublicationId(_)));
}

#[tokio::test]
async fn test_unconfigured_marketplace_is_unsupported() {
    let mut listing = base_listing();
    listing.content.marketplace = Marketplace::RARIBLE;
    let kit = ActionKit::builder(registry())
        .marketplace(marketplace(Marketplace::RARIBLE, "rarible.com", listing, 0))
        .build();

    let err = kit
        .detect_action(OPENSEA_URI, "10")
        .await
        .unwrap_err();

    assert!(matches!(err, ResolutionError::UnsupportedMarketplace(_)));
}
