//! Marketplace contract ABI.
//!
//! Creation and purchase calls carry a content hash and the wallet's
//! signature over it, which the contract verifies against the sender.

use alloy::sol;

sol! {
    interface IMarketplace {
        #[derive(Debug, PartialEq, Eq)]
        struct NFTData {
            address creator;
            string metaData;
            uint256 price;
            uint256 copies;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct Royalty {
            address receiver;
            uint256 basisPoints;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct ProjectData {
            address owner;
            string metaData;
            uint256 budget;
            uint256 deadline;
        }

        function createNFT(NFTData nftData, Royalty[] royalties, bytes32 hash, bytes signature) external;
        function mintNFTs(NFTData nftData, bytes32 hash, bytes signature) external payable;
        function changeTokenPriceAndSelling(uint256 tokenId, bool status, uint256 newPrice) external;
        function buyNFT(uint256 nftId, address owner, address creator, bytes32 hash, bytes signature) external payable;
        function createProject(ProjectData projectData, bytes32 hash, bytes signature) external;
        function fundProject(uint256 projectId, bytes32 hash, bytes signature) external payable;
        function withdrawProjectFunds(uint256 projectId, bytes32 hash, bytes signature) external;

        /// Emitted once per created item.
        #[derive(Debug)]
        event NewNFT(uint256 indexed tokenId, address indexed creator);

        /// Emitted by `mintNFTs` with every token minted in the call.
        #[derive(Debug)]
        event mintedNFTs(uint256[] tokenIds);

        /// Emitted once per created funding project.
        #[derive(Debug)]
        event NewProject(uint256 indexed projectId, address indexed owner);
    }
}

#[cfg(test)]
mod tests {
    use super::IMarketplace::*;
    use alloy::primitives::{Address, Bytes, B256, U256};
    use alloy::sol_types::{SolCall, SolEvent};

    #[test]
    fn test_selectors_follow_signatures() {
        assert_eq!(
            changeTokenPriceAndSellingCall::SIGNATURE,
            "changeTokenPriceAndSelling(uint256,bool,uint256)"
        );
        assert_eq!(
            buyNFTCall::SIGNATURE,
            "buyNFT(uint256,address,address,bytes32,bytes)"
        );
        assert_eq!(
            createNFTCall::SIGNATURE,
            "createNFT((address,string,uint256,uint256),(address,uint256)[],bytes32,bytes)"
        );
        assert_eq!(mintedNFTs::SIGNATURE, "mintedNFTs(uint256[])");
    }

    #[test]
    fn test_call_encoding_starts_with_selector() {
        let call = withdrawProjectFundsCall {
            projectId: U256::from(2),
            hash: B256::repeat_byte(0x01),
            signature: Bytes::from(vec![0u8; 65]),
        };
        let data = call.abi_encode();
        assert_eq!(&data[..4], withdrawProjectFundsCall::SELECTOR.as_slice());

        let decoded = withdrawProjectFundsCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.projectId, U256::from(2));
    }

    #[test]
    fn test_struct_argument_encoding() {
        let call = mintNFTsCall {
            nftData: NFTData {
                creator: Address::repeat_byte(0x0a),
                metaData: "ipfs://meta".to_string(),
                price: U256::from(10),
                copies: U256::from(3),
            },
            hash: B256::ZERO,
            signature: Bytes::new(),
        };
        let decoded = mintNFTsCall::abi_decode(&call.abi_encode()).unwrap();
        assert_eq!(decoded.nftData, call.nftData);
    }
}
