//! Launchpad factory contract bindings.
//!
//! Only the read-only subset consumed by listings synchronization is
//! declared; sale creation and trading are issued by other clients.

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract Factory {
        struct TokenSale {
            address token;
            string name;
            address creator;
            uint256 sold;
            uint256 raised;
            bool isOpen;
        }

        /// Listing fee in native currency units.
        function fee() external view returns (uint256);

        /// Number of sales ever created, ascending creation index.
        function totalTokens() external view returns (uint256);

        function getTokenSale(uint256 index) external view returns (TokenSale memory);
    }
}
