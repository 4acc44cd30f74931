//! Solidity interfaces of the purchase open action modules.
//!
//! The layouts below are persisted on-chain as soon as a post references a module, so any
//! change to them breaks already published actions.
use alloy_sol_types::sol;

sol! {
    /// Initialization payload stored with a purchase open action when a post is published.
    #[derive(Debug, PartialEq, Eq)]
    struct PurchaseActionInit {
        address nftContract;
        uint256 tokenId;
        uint256 chainId;
        uint8 saleKind;
        uint256 price;
        address currency;
        address seller;
        uint256 publishingClientProfileId;
    }

    /// Module specific part of an execution, passed as `actionModuleData`.
    #[derive(Debug, PartialEq, Eq)]
    struct PurchaseActionExecution {
        address paymentToken;
        uint256 quantity;
        address recipient;
        uint256 executingClientProfileId;
        string sourceUrl;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct ProcessActionParams {
        uint256 publicationActedProfileId;
        uint256 publicationActedId;
        uint256 actorProfileId;
        address actorProfileOwner;
        address transactionExecutor;
        uint256[] referrerProfileIds;
        uint256[] referrerPubIds;
        bytes actionModuleData;
    }

    function processPublicationAction(ProcessActionParams calldata params) external returns (bytes memory);
}
